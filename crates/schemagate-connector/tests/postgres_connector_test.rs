//! Integration tests for the PostgreSQL connector.
//!
//! These tests require Docker and are ignored by default:
//! `cargo test -p schemagate-connector -- --ignored`

mod common;

use common::TestDatabase;
use schemagate_connector::{DatabaseConnector, DbType, ObjectType, QueryExecutor};
use serde_json::json;

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_select_returns_typed_rows() {
    let db = TestDatabase::new().await;
    let conn = db.connect().await;

    let result = conn
        .execute_query("SELECT 1 AS one, 'x'::text AS label, true AS flag, NULL::int AS nothing, '{\"a\":1}'::jsonb AS doc")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["one", "label", "flag", "nothing", "doc"]);
    assert_eq!(result.row_count, 1);
    assert_eq!(
        serde_json::Value::Object(result.data[0].clone()),
        json!({"one": 1, "label": "x", "flag": true, "nothing": null, "doc": {"a": 1}})
    );
    conn.close().await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_statements_report_affected_rows() {
    let db = TestDatabase::new().await;
    let conn = db.connect().await;

    conn.execute_query("CREATE TABLE items (id serial PRIMARY KEY, name text NOT NULL)")
        .await
        .unwrap();
    let insert = conn
        .execute_query("INSERT INTO items (name) VALUES ('a'), ('b'), ('c')")
        .await
        .unwrap();

    assert_eq!(insert.affected_rows, 3);
    assert!(insert.columns.is_empty());
    assert_eq!(conn.db_type(), DbType::Postgres);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_empty_select_keeps_columns() {
    let db = TestDatabase::new().await;
    let conn = db.connect().await;

    let result = conn.execute_query("SELECT 1 AS a, 'x' AS b WHERE false").await.unwrap();

    assert_eq!(result.columns, vec!["a", "b"]);
    assert!(result.data.is_empty());
    assert_eq!(result.row_count, 0);
    assert_eq!(result.affected_rows, 0);

    let update = conn
        .execute_query("CREATE TABLE empty_t (id int); UPDATE empty_t SET id = 1")
        .await
        .unwrap();
    assert!(update.columns.is_empty());
    conn.close().await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_table_ddl_from_catalog() {
    let db = TestDatabase::new().await;
    let conn = db.connect().await;

    conn.execute_query(
        "CREATE TABLE customers (id serial PRIMARY KEY, email varchar(200) NOT NULL UNIQUE); \
         CREATE TABLE orders (id serial PRIMARY KEY, customer_id int REFERENCES customers(id))",
    )
    .await
    .unwrap();

    let ddl = conn.get_ddl("Orders", &ObjectType::Table).await.unwrap();
    assert!(ddl.starts_with("CREATE TABLE public.orders ("), "{ddl}");
    assert!(ddl.contains("FOREIGN KEY (customer_id) REFERENCES customers(id)"), "{ddl}");

    let all = conn.get_ddl("*", &ObjectType::Table).await.unwrap();
    assert!(all.contains("CREATE TABLE public.customers"));
    assert!(all.contains("CREATE TABLE public.orders"));

    let missing = conn.get_ddl("ghost", &ObjectType::Table).await.unwrap();
    assert!(missing.starts_with("-- Table 'ghost' not found."), "{missing}");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_view_and_closed_connection() {
    let db = TestDatabase::new().await;
    let conn = db.connect().await;

    conn.execute_query("CREATE VIEW v_numbers AS SELECT 1 AS n")
        .await
        .unwrap();
    let ddl = conn.get_ddl("v_numbers", &ObjectType::View).await.unwrap();
    assert!(ddl.starts_with("CREATE OR REPLACE VIEW public.v_numbers AS\n"));

    conn.close().await;
    assert!(conn.execute_query("SELECT 1").await.is_err());
    assert!(!db.connection_string().is_empty());
}
