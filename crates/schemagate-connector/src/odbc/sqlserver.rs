//! SQL Server DDL reconstruction from `sys.*` catalog views.

use crate::{quote_literal, record_bool, record_i64, record_str, ObjectType, QueryExecutor, Record};
use schemagate_core::SchemaGateResult;
use tracing::debug;

/// Column metadata from `sys.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    /// Storage length in bytes, `-1` for `MAX`.
    pub max_length: i64,
    pub precision: i64,
    pub scale: i64,
    pub is_nullable: bool,
    pub is_identity: bool,
}

impl ColumnDef {
    fn from_record(row: &Record) -> Self {
        Self {
            name: record_str(row, "column_name").unwrap_or_default().to_string(),
            data_type: record_str(row, "data_type").unwrap_or_default().to_string(),
            max_length: record_i64(row, "max_length").unwrap_or(0),
            precision: record_i64(row, "precision").unwrap_or(0),
            scale: record_i64(row, "scale").unwrap_or(0),
            is_nullable: record_bool(row, "is_nullable"),
            is_identity: record_bool(row, "is_identity"),
        }
    }

    /// Renders the column as it appears inside `CREATE TABLE`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("    {} {}", self.name, self.data_type);

        match self.data_type.to_lowercase().as_str() {
            "varchar" | "char" => out.push_str(&format!("({})", self.length_spec(1))),
            // sys.columns reports bytes; n-types use two per character
            "nvarchar" | "nchar" => out.push_str(&format!("({})", self.length_spec(2))),
            "decimal" | "numeric" => {
                out.push_str(&format!("({}, {})", self.precision, self.scale));
            }
            _ => {}
        }

        out.push_str(if self.is_nullable { " NULL" } else { " NOT NULL" });
        if self.is_identity {
            out.push_str(" IDENTITY(1,1)");
        }
        out
    }

    fn length_spec(&self, bytes_per_char: i64) -> String {
        if self.max_length == -1 {
            "MAX".to_string()
        } else {
            (self.max_length / bytes_per_char).to_string()
        }
    }
}

/// A foreign key with its column pairs in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub parent_table: String,
    pub referenced_table: String,
    pub parent_columns: Vec<String>,
    pub referenced_columns: Vec<String>,
}

/// Groups `sys.foreign_key_columns` rows by constraint, keeping first-seen order.
#[must_use]
pub fn group_foreign_keys(rows: &[Record]) -> Vec<ForeignKey> {
    let mut keys: Vec<ForeignKey> = Vec::new();

    for row in rows {
        let name = record_str(row, "fk_name").unwrap_or_default();
        let parent_column = record_str(row, "parent_column").unwrap_or_default().to_string();
        let referenced_column = record_str(row, "referenced_column").unwrap_or_default().to_string();

        if let Some(key) = keys.iter_mut().find(|k| k.name == name) {
            key.parent_columns.push(parent_column);
            key.referenced_columns.push(referenced_column);
        } else {
            keys.push(ForeignKey {
                name: name.to_string(),
                parent_table: record_str(row, "parent_table").unwrap_or_default().to_string(),
                referenced_table: record_str(row, "referenced_table").unwrap_or_default().to_string(),
                parent_columns: vec![parent_column],
                referenced_columns: vec![referenced_column],
            });
        }
    }

    keys
}

/// Renders `CREATE TABLE` plus primary and foreign key constraints.
#[must_use]
pub fn render_table(
    table: &str,
    columns: &[ColumnDef],
    primary_key: Option<(&str, Vec<&str>)>,
    foreign_keys: &[ForeignKey],
) -> String {
    let body = columns.iter().map(ColumnDef::render).collect::<Vec<_>>().join(",\n");
    let mut ddl = format!("CREATE TABLE {} (\n{}\n);", table, body);

    if let Some((pk_name, pk_columns)) = primary_key {
        ddl.push_str(&format!(
            "\n\nALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({});",
            table,
            pk_name,
            pk_columns.join(", ")
        ));
    }

    for fk in foreign_keys {
        ddl.push_str(&format!(
            "\n\nALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({});",
            fk.parent_table,
            fk.name,
            fk.parent_columns.join(", "),
            fk.referenced_table,
            fk.referenced_columns.join(", ")
        ));
    }

    ddl
}

/// Returns the DDL of a SQL Server object.
pub async fn get_ddl(
    exec: &dyn QueryExecutor,
    object_name: &str,
    object_type: &ObjectType,
) -> SchemaGateResult<String> {
    debug!("Getting DDL for object: {}, type: {}", object_name, object_type);

    match object_type {
        ObjectType::Table if object_name == "*" => all_tables_ddl(exec).await,
        ObjectType::Table => table_ddl(exec, object_name).await,
        ObjectType::View => {
            let sql = format!(
                "SELECT m.definition FROM sys.sql_modules m \
                 JOIN sys.views v ON m.object_id = v.object_id WHERE v.name = {}",
                quote_literal(object_name)
            );
            Ok(exec.execute_query(&sql).await?.first_str("definition").map_or_else(
                || format!("-- View {} definition not found", object_name),
                |definition| format!("CREATE VIEW {} AS\n{}", object_name, definition),
            ))
        }
        ObjectType::Procedure | ObjectType::StoredProcedure => {
            let sql = format!(
                "SELECT m.definition FROM sys.sql_modules m \
                 JOIN sys.procedures p ON m.object_id = p.object_id WHERE p.name = {}",
                quote_literal(object_name)
            );
            Ok(exec.execute_query(&sql).await?.first_str("definition").map_or_else(
                || format!("-- Stored procedure {} definition not found", object_name),
                ToString::to_string,
            ))
        }
        ObjectType::Function => {
            let sql = format!(
                "SELECT m.definition FROM sys.sql_modules m \
                 JOIN sys.objects o ON m.object_id = o.object_id \
                 WHERE o.type_desc LIKE '%FUNCTION%' AND o.name = {}",
                quote_literal(object_name)
            );
            Ok(exec.execute_query(&sql).await?.first_str("definition").map_or_else(
                || format!("-- Function {} definition not found", object_name),
                ToString::to_string,
            ))
        }
        other => Ok(other.unsupported_comment()),
    }
}

async fn all_tables_ddl(exec: &dyn QueryExecutor) -> SchemaGateResult<String> {
    let tables = exec
        .execute_query("SELECT name FROM sys.tables ORDER BY name")
        .await?;

    if tables.is_empty() {
        return Ok("-- No tables found in database".to_string());
    }

    let mut parts = Vec::with_capacity(tables.data.len());
    for name in tables.column_strs("name") {
        parts.push(table_ddl(exec, name).await?);
    }
    Ok(parts.join("\n\n").trim().to_string())
}

async fn table_ddl(exec: &dyn QueryExecutor, table: &str) -> SchemaGateResult<String> {
    let name = quote_literal(table);

    let columns = exec
        .execute_query(&format!(
            "SELECT c.name AS column_name, t.name AS data_type, c.max_length, c.precision, \
             c.scale, c.is_nullable, c.is_identity, c.column_id \
             FROM sys.columns c \
             JOIN sys.types t ON c.user_type_id = t.user_type_id \
             JOIN sys.tables tbl ON c.object_id = tbl.object_id \
             WHERE tbl.name = {} ORDER BY c.column_id",
            name
        ))
        .await?;

    if columns.is_empty() {
        return Ok(format!("-- Table {} definition not found", table));
    }
    let columns: Vec<ColumnDef> = columns.data.iter().map(ColumnDef::from_record).collect();

    let pk = exec
        .execute_query(&format!(
            "SELECT i.name AS index_name, c.name AS column_name \
             FROM sys.indexes i \
             JOIN sys.index_columns ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id \
             JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id \
             JOIN sys.tables t ON i.object_id = t.object_id \
             WHERE i.is_primary_key = 1 AND t.name = {} ORDER BY ic.key_ordinal",
            name
        ))
        .await?;
    let primary_key = pk
        .first_str("index_name")
        .map(|pk_name| (pk_name, pk.column_strs("column_name")));

    let fks = exec
        .execute_query(&format!(
            "SELECT fk.name AS fk_name, \
             OBJECT_NAME(fk.parent_object_id) AS parent_table, \
             COL_NAME(fkc.parent_object_id, fkc.parent_column_id) AS parent_column, \
             OBJECT_NAME(fk.referenced_object_id) AS referenced_table, \
             COL_NAME(fkc.referenced_object_id, fkc.referenced_column_id) AS referenced_column \
             FROM sys.foreign_keys fk \
             JOIN sys.foreign_key_columns fkc ON fk.object_id = fkc.constraint_object_id \
             WHERE OBJECT_NAME(fk.parent_object_id) = {} \
             ORDER BY fk.name, fkc.constraint_column_id",
            name
        ))
        .await?;

    Ok(render_table(
        table,
        &columns,
        primary_key,
        &group_foreign_keys(&fks.data),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{rows, ScriptedExecutor};
    use serde_json::json;

    fn orders_script(sql: &str) -> SchemaGateResult<crate::QueryResult> {
        if sql.contains("FROM sys.columns c") {
            Ok(rows(vec![
                json!({"column_name": "id", "data_type": "int", "max_length": 4, "precision": 10, "scale": 0, "is_nullable": false, "is_identity": true}),
                json!({"column_name": "customer", "data_type": "nvarchar", "max_length": 200, "precision": 0, "scale": 0, "is_nullable": true, "is_identity": false}),
                json!({"column_name": "notes", "data_type": "varchar", "max_length": -1, "precision": 0, "scale": 0, "is_nullable": true, "is_identity": false}),
                json!({"column_name": "total", "data_type": "decimal", "max_length": 9, "precision": 18, "scale": 2, "is_nullable": false, "is_identity": false}),
            ]))
        } else if sql.contains("i.is_primary_key = 1") {
            Ok(rows(vec![json!({"index_name": "PK_orders", "column_name": "id"})]))
        } else if sql.contains("FROM sys.foreign_keys fk") {
            Ok(rows(vec![
                json!({"fk_name": "FK_orders_region", "parent_table": "orders", "parent_column": "country", "referenced_table": "regions", "referenced_column": "country"}),
                json!({"fk_name": "FK_orders_region", "parent_table": "orders", "parent_column": "region", "referenced_table": "regions", "referenced_column": "code"}),
                json!({"fk_name": "FK_orders_customer", "parent_table": "orders", "parent_column": "customer_id", "referenced_table": "customers", "referenced_column": "id"}),
            ]))
        } else {
            Ok(rows(vec![]))
        }
    }

    #[tokio::test]
    async fn test_table_ddl() {
        let exec = ScriptedExecutor::new(orders_script);
        let ddl = get_ddl(&exec, "orders", &ObjectType::Table).await.unwrap();

        assert_eq!(
            ddl,
            "CREATE TABLE orders (\n\
             \x20   id int NOT NULL IDENTITY(1,1),\n\
             \x20   customer nvarchar(100) NULL,\n\
             \x20   notes varchar(MAX) NULL,\n\
             \x20   total decimal(18, 2) NOT NULL\n\
             );\n\n\
             ALTER TABLE orders ADD CONSTRAINT PK_orders PRIMARY KEY (id);\n\n\
             ALTER TABLE orders ADD CONSTRAINT FK_orders_region FOREIGN KEY (country, region) REFERENCES regions (country, code);\n\n\
             ALTER TABLE orders ADD CONSTRAINT FK_orders_customer FOREIGN KEY (customer_id) REFERENCES customers (id);"
        );
    }

    #[tokio::test]
    async fn test_all_tables_and_empty_database() {
        let exec = ScriptedExecutor::new(|sql| {
            if sql.contains("FROM sys.tables ORDER BY name") {
                Ok(rows(vec![json!({"name": "a"}), json!({"name": "b"})]))
            } else if sql.contains("FROM sys.columns c") {
                Ok(rows(vec![json!({"column_name": "x", "data_type": "bit", "is_nullable": 1, "is_identity": 0})]))
            } else {
                Ok(rows(vec![]))
            }
        });
        let ddl = get_ddl(&exec, "*", &ObjectType::Table).await.unwrap();
        assert_eq!(
            ddl,
            "CREATE TABLE a (\n    x bit NULL\n);\n\nCREATE TABLE b (\n    x bit NULL\n);"
        );

        let empty = ScriptedExecutor::new(|_| Ok(rows(vec![])));
        assert_eq!(
            get_ddl(&empty, "*", &ObjectType::Table).await.unwrap(),
            "-- No tables found in database"
        );
        assert_eq!(
            get_ddl(&empty, "ghost", &ObjectType::Table).await.unwrap(),
            "-- Table ghost definition not found"
        );
    }

    #[tokio::test]
    async fn test_modules() {
        let exec = ScriptedExecutor::new(|sql| {
            if sql.contains("sys.views") {
                Ok(rows(vec![json!({"definition": "SELECT 1 AS one"})]))
            } else {
                Ok(rows(vec![]))
            }
        });

        assert_eq!(
            get_ddl(&exec, "v_one", &ObjectType::View).await.unwrap(),
            "CREATE VIEW v_one AS\nSELECT 1 AS one"
        );
        assert_eq!(
            get_ddl(&exec, "p", &ObjectType::StoredProcedure).await.unwrap(),
            "-- Stored procedure p definition not found"
        );
        assert_eq!(
            get_ddl(&exec, "f", &ObjectType::Function).await.unwrap(),
            "-- Function f definition not found"
        );
        assert_eq!(
            get_ddl(&exec, "s", &ObjectType::Sequence).await.unwrap(),
            "-- DDL generation for sequence is not supported yet"
        );
    }

    #[tokio::test]
    async fn test_object_names_are_quoted() {
        let exec = ScriptedExecutor::new(|_| Ok(rows(vec![])));
        get_ddl(&exec, "o'hare", &ObjectType::View).await.unwrap();
        assert!(exec.executed()[0].ends_with("WHERE v.name = 'o''hare'"));
    }
}
