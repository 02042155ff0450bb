//! PostgreSQL DDL extraction from the system catalogs.

use crate::{quote_literal, ObjectType, QueryExecutor};
use schemagate_core::SchemaGateResult;
use tracing::debug;

/// Installs `pg_get_tabledef(oid)`, which renders a table with its
/// constraints, indexes and column comments.
const CREATE_TABLEDEF_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION pg_get_tabledef(p_table_oid oid)
RETURNS text AS
$BODY$
DECLARE
    v_table_name text;
    v_schema_name text;
    v_ret text;
    v_column_record record;
    v_constraint_record record;
    v_index_record record;
    v_comment_record record;
BEGIN
    SELECT n.nspname, c.relname INTO v_schema_name, v_table_name
    FROM pg_class c
    JOIN pg_namespace n ON c.relnamespace = n.oid
    WHERE c.oid = p_table_oid;

    v_ret := 'CREATE TABLE ' || v_schema_name || '.' || v_table_name || ' (' || E'\n';

    FOR v_column_record IN
        SELECT
            a.attname AS column_name,
            pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
            CASE WHEN a.attnotnull THEN 'NOT NULL' ELSE 'NULL' END AS nullable,
            CASE WHEN a.atthasdef THEN pg_get_expr(d.adbin, d.adrelid) ELSE '' END AS default_value
        FROM pg_catalog.pg_attribute a
        LEFT JOIN pg_catalog.pg_attrdef d ON (a.attrelid = d.adrelid AND a.attnum = d.adnum)
        WHERE a.attrelid = p_table_oid
        AND a.attnum > 0
        AND NOT a.attisdropped
        ORDER BY a.attnum
    LOOP
        v_ret := v_ret || '    ' || v_column_record.column_name || ' ' || v_column_record.data_type;
        IF v_column_record.default_value != '' THEN
            v_ret := v_ret || ' DEFAULT ' || v_column_record.default_value;
        END IF;
        v_ret := v_ret || ' ' || v_column_record.nullable || ',' || E'\n';
    END LOOP;

    v_ret := substring(v_ret, 1, length(v_ret) - 2) || E'\n);' || E'\n';

    FOR v_constraint_record IN
        SELECT con.conname, pg_get_constraintdef(con.oid) AS condef
        FROM pg_constraint con
        WHERE con.conrelid = p_table_oid AND con.contype = 'p'
    LOOP
        v_ret := v_ret || E'\n' || 'ALTER TABLE ' || v_schema_name || '.' || v_table_name ||
                 ' ADD CONSTRAINT ' || v_constraint_record.conname ||
                 ' ' || v_constraint_record.condef || ';';
    END LOOP;

    FOR v_constraint_record IN
        SELECT con.conname, pg_get_constraintdef(con.oid) AS condef
        FROM pg_constraint con
        WHERE con.conrelid = p_table_oid AND con.contype != 'p'
    LOOP
        v_ret := v_ret || E'\n' || 'ALTER TABLE ' || v_schema_name || '.' || v_table_name ||
                 ' ADD CONSTRAINT ' || v_constraint_record.conname ||
                 ' ' || v_constraint_record.condef || ';';
    END LOOP;

    FOR v_index_record IN
        SELECT indexrelid::regclass AS index_name, pg_get_indexdef(indexrelid) AS indexdef
        FROM pg_index
        WHERE indrelid = p_table_oid AND indisprimary = false
    LOOP
        v_ret := v_ret || E'\n' || v_index_record.indexdef || ';';
    END LOOP;

    FOR v_comment_record IN
        SELECT col.attname AS column_name,
               pg_description.description
        FROM pg_description
        JOIN pg_attribute col ON pg_description.objoid = p_table_oid
                            AND col.attrelid = p_table_oid
                            AND pg_description.objsubid = col.attnum
        WHERE NOT col.attisdropped
    LOOP
        IF v_comment_record.description IS NOT NULL THEN
            v_ret := v_ret || E'\n' || 'COMMENT ON COLUMN ' || v_schema_name || '.' || v_table_name || '.' ||
                     v_comment_record.column_name || ' IS ''' ||
                     replace(v_comment_record.description, '''', '''''') || ''';';
        END IF;
    END LOOP;

    RETURN v_ret;
END;
$BODY$
LANGUAGE plpgsql;
"#;

/// Returns the DDL of a PostgreSQL object.
pub async fn get_ddl(
    exec: &dyn QueryExecutor,
    object_name: &str,
    object_type: &ObjectType,
) -> SchemaGateResult<String> {
    debug!("Getting DDL for object: {}, type: {}", object_name, object_type);

    match object_type {
        ObjectType::Table => {
            ensure_tabledef_function(exec).await;
            if object_name == "*" {
                all_tables_ddl(exec).await
            } else {
                Ok(table_ddl(exec, object_name).await)
            }
        }
        ObjectType::View => view_ddl(exec, object_name).await,
        ObjectType::Function | ObjectType::Procedure => function_ddl(exec, object_name).await,
        ObjectType::Trigger => trigger_ddl(exec, object_name).await,
        ObjectType::Sequence => sequence_ddl(exec, object_name).await,
        other => Ok(other.unsupported_comment()),
    }
}

async fn ensure_tabledef_function(exec: &dyn QueryExecutor) {
    if let Err(e) = exec.execute_query(CREATE_TABLEDEF_FUNCTION).await {
        // Missing privileges are fine when the function already exists.
        debug!("Could not install pg_get_tabledef: {}", e);
    }
}

async fn all_tables_ddl(exec: &dyn QueryExecutor) -> SchemaGateResult<String> {
    let tables = exec
        .execute_query(
            "SELECT tablename AS table_name FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename",
        )
        .await?;

    if tables.is_empty() {
        return Ok("-- No tables found in the public schema".to_string());
    }

    let mut parts = Vec::with_capacity(tables.data.len());
    for name in tables.column_strs("table_name") {
        parts.push(table_ddl(exec, name).await);
    }
    Ok(parts.join("\n\n").trim().to_string())
}

/// Renders one table, resolving the name the way `psql` users type it.
async fn table_ddl(exec: &dyn QueryExecutor, object_name: &str) -> String {
    match resolved_table_ddl(exec, object_name).await {
        Ok(ddl) => ddl,
        Err(lookup_error) => match case_insensitive_table_ddl(exec, object_name).await {
            Ok(Some(ddl)) => ddl,
            Ok(None) => format!("-- Table '{}' not found. Error: {}", object_name, lookup_error),
            Err(e) => format!("-- Error getting table definition: {}", e),
        },
    }
}

async fn resolved_table_ddl(exec: &dyn QueryExecutor, object_name: &str) -> SchemaGateResult<String> {
    let resolved = resolve_table_name(exec, object_name).await?;

    let result = exec
        .execute_query(&format!(
            "SELECT pg_get_tabledef({}::regclass::oid) AS ddl",
            quote_literal(&resolved)
        ))
        .await?;

    Ok(result.first_str("ddl").map_or_else(
        || format!("-- Table {} definition not found", resolved),
        ToString::to_string,
    ))
}

/// Tries the name as given, lowercased, and both again under `public`.
async fn resolve_table_name(exec: &dyn QueryExecutor, object_name: &str) -> SchemaGateResult<String> {
    let lowercase = object_name.to_lowercase();
    let candidates = [
        object_name.to_string(),
        lowercase.clone(),
        format!("public.{}", object_name),
        format!("public.{}", lowercase),
    ];

    for candidate in candidates {
        let result = exec
            .execute_query(&format!(
                "SELECT to_regclass({}) IS NOT NULL AS found",
                quote_literal(&candidate)
            ))
            .await?;

        let found = result
            .data
            .first()
            .is_some_and(|row| crate::record_bool(row, "found"));
        if found {
            return Ok(candidate);
        }
    }

    Ok(object_name.to_string())
}

async fn case_insensitive_table_ddl(
    exec: &dyn QueryExecutor,
    object_name: &str,
) -> SchemaGateResult<Option<String>> {
    let search = object_name.to_lowercase();
    let filter = match search.split_once('.') {
        Some((schema, name)) => format!(
            "LOWER(schemaname) = {} AND LOWER(tablename) = {}",
            quote_literal(schema),
            quote_literal(name)
        ),
        None => format!("LOWER(tablename) = {}", quote_literal(&search)),
    };

    let matches = exec
        .execute_query(&format!(
            "SELECT quote_ident(schemaname) || '.' || quote_ident(tablename) AS full_name \
             FROM pg_tables WHERE {}",
            filter
        ))
        .await?;

    let Some(full_name) = matches.first_str("full_name") else {
        return Ok(None);
    };

    let result = exec
        .execute_query(&format!(
            "SELECT pg_get_tabledef({}::regclass::oid) AS ddl",
            quote_literal(full_name)
        ))
        .await?;

    Ok(result.first_str("ddl").map(ToString::to_string))
}

async fn view_ddl(exec: &dyn QueryExecutor, object_name: &str) -> SchemaGateResult<String> {
    const SELECT_VIEW: &str = "SELECT 'CREATE OR REPLACE VIEW ' || schemaname || '.' || viewname || \
                               E' AS\\n' || definition AS ddl FROM pg_views";

    let result = exec
        .execute_query(&format!(
            "{} WHERE viewname = {}",
            SELECT_VIEW,
            quote_literal(object_name)
        ))
        .await?;
    if let Some(ddl) = result.first_str("ddl") {
        return Ok(ddl.to_string());
    }

    if let Some((schema, name)) = object_name.split_once('.') {
        let result = exec
            .execute_query(&format!(
                "{} WHERE viewname = {} AND schemaname = {}",
                SELECT_VIEW,
                quote_literal(name),
                quote_literal(schema)
            ))
            .await?;
        if let Some(ddl) = result.first_str("ddl") {
            return Ok(ddl.to_string());
        }
    }

    Ok(format!("-- View {} definition not found", object_name))
}

async fn function_ddl(exec: &dyn QueryExecutor, object_name: &str) -> SchemaGateResult<String> {
    let result = exec
        .execute_query(&format!(
            "SELECT pg_get_functiondef(oid) AS ddl FROM pg_proc WHERE proname = {}",
            quote_literal(object_name)
        ))
        .await?;
    if let Some(ddl) = result.first_str("ddl") {
        return Ok(ddl.to_string());
    }

    if let Some((schema, name)) = object_name.split_once('.') {
        let result = exec
            .execute_query(&format!(
                "SELECT pg_get_functiondef(p.oid) AS ddl FROM pg_proc p \
                 JOIN pg_namespace n ON p.pronamespace = n.oid \
                 WHERE p.proname = {} AND n.nspname = {}",
                quote_literal(name),
                quote_literal(schema)
            ))
            .await?;
        if let Some(ddl) = result.first_str("ddl") {
            return Ok(ddl.to_string());
        }
    }

    Ok(format!("-- Function/Procedure {} definition not found", object_name))
}

async fn trigger_ddl(exec: &dyn QueryExecutor, object_name: &str) -> SchemaGateResult<String> {
    let result = exec
        .execute_query(&format!(
            "SELECT pg_get_triggerdef(t.oid) AS ddl FROM pg_trigger t \
             JOIN pg_class c ON t.tgrelid = c.oid WHERE t.tgname = {}",
            quote_literal(object_name)
        ))
        .await?;

    let definitions = result.column_strs("ddl");
    if definitions.is_empty() {
        return Ok(format!("-- Trigger {} definition not found", object_name));
    }

    Ok(definitions
        .into_iter()
        .map(|ddl| format!("{};\n\n", ddl))
        .collect())
}

async fn sequence_ddl(exec: &dyn QueryExecutor, object_name: &str) -> SchemaGateResult<String> {
    let result = exec
        .execute_query(&format!(
            "SELECT 'CREATE SEQUENCE ' || sequence_schema || '.' || sequence_name || \
             ' INCREMENT BY ' || increment || \
             ' MINVALUE ' || minimum_value || \
             ' MAXVALUE ' || maximum_value || \
             ' START WITH ' || start_value || \
             CASE WHEN cycle_option = 'YES' THEN ' CYCLE' ELSE ' NO CYCLE' END || \
             ';' AS ddl \
             FROM information_schema.sequences WHERE sequence_name = {}",
            quote_literal(object_name)
        ))
        .await?;

    Ok(result.first_str("ddl").map_or_else(
        || format!("-- Sequence {} definition not found", object_name),
        ToString::to_string,
    ))
}
