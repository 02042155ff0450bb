//! Cache key generators for consistent key naming.
//!
//! Keys embed a SHA-256 digest of the call arguments so connection
//! strings never appear in Redis in plain form.

use serde_json::json;
use sha2::{Digest, Sha256};

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "db_api";

/// Operation name for query results.
pub const QUERY_OPERATION: &str = "execute_query_with_cache";

/// Operation name for DDL results.
pub const DDL_OPERATION: &str = "get_ddl_with_cache";

fn digest(operation: &str, args: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(b":");
    hasher.update(args.to_string().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Key for a query result.
#[must_use]
pub fn query_result(connection_string: &str, db_type: &str, query: &str) -> String {
    let args = json!([connection_string, db_type, query]);
    format!("{}:{}:{}", CACHE_PREFIX, QUERY_OPERATION, digest(QUERY_OPERATION, &args))
}

/// Key for a DDL result.
#[must_use]
pub fn ddl_result(
    connection_string: &str,
    db_type: &str,
    object_name: &str,
    object_type: &str,
) -> String {
    let args = json!([connection_string, db_type, object_name, object_type]);
    format!("{}:{}:{}", CACHE_PREFIX, DDL_OPERATION, digest(DDL_OPERATION, &args))
}
