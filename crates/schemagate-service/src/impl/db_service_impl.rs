//! Query and DDL service implementation.

use crate::cache::{cache_keys, CacheExt, CacheInterface};
use crate::db_service::DbService;
use crate::dto::{DdlCommand, DdlOutcome, QueryCommand, QueryOutcome};
use async_trait::async_trait;
use schemagate_connector::{parse_db_type, ConnectorFactory, ObjectType, QueryResult};
use schemagate_core::SchemaGateResult;
use schemagate_security::mask_connection_string;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shaku component running statements through a connector factory,
/// with results cached in Redis on request.
#[derive(Component)]
#[shaku(interface = DbService)]
pub struct DbServiceComponent {
    #[shaku(inject)]
    connector_factory: Arc<dyn ConnectorFactory>,
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
}

impl std::fmt::Debug for DbServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbServiceComponent")
            .field("cache_enabled", &self.cache.is_enabled())
            .finish_non_exhaustive()
    }
}

impl DbServiceComponent {
    /// Creates a service from explicit collaborators.
    pub fn new(connector_factory: Arc<dyn ConnectorFactory>, cache: Arc<dyn CacheInterface>) -> Self {
        Self {
            connector_factory,
            cache,
        }
    }

    /// Reads a cached payload. Cache failures count as a miss; an
    /// undecodable entry is dropped.
    async fn lookup<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let raw = match self.cache.get_raw(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Cache lookup failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable cache entry '{}': {}", key, e);
                if let Err(e) = self.cache.delete(key).await {
                    warn!("Failed to delete cache entry '{}': {}", key, e);
                }
                None
            }
        }
    }

    async fn store<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) {
        match self.cache.set(key, value, ttl).await {
            Ok(()) => debug!("Stored '{}' for {}s", key, ttl.as_secs()),
            Err(e) => warn!("Cache store failed: {}", e),
        }
    }

    async fn run_query(&self, command: &QueryCommand) -> SchemaGateResult<QueryResult> {
        let db_type = parse_db_type(&command.db_type)?;
        let connector = self
            .connector_factory
            .connect(db_type, &command.connection_string)
            .await?;

        let result = connector.execute_query(&command.query).await;
        connector.close().await;
        result
    }

    async fn run_ddl(&self, command: &DdlCommand) -> SchemaGateResult<String> {
        let db_type = parse_db_type(&command.db_type)?;
        let object_type = ObjectType::parse(&command.object_type);
        let connector = self
            .connector_factory
            .connect(db_type, &command.connection_string)
            .await?;

        let ddl = connector.get_ddl(&command.object_name, &object_type).await;
        connector.close().await;
        ddl
    }
}

#[async_trait]
impl DbService for DbServiceComponent {
    async fn execute_query(&self, command: QueryCommand) -> QueryOutcome {
        let key = command.cache.enabled.then(|| {
            cache_keys::query_result(&command.connection_string, &command.db_type, &command.query)
        });

        if let Some(key) = &key {
            if let Some(mut outcome) = self.lookup::<QueryOutcome>(key).await {
                debug!("Serving query from cache");
                outcome.cached = true;
                return outcome;
            }
        }

        let outcome = match self.run_query(&command).await {
            Ok(result) => {
                info!(
                    db_type = %command.db_type,
                    rows = result.row_count,
                    affected = result.affected_rows,
                    "Query executed"
                );
                QueryOutcome::success(&command, result)
            }
            Err(e) => {
                warn!(
                    db_type = %command.db_type,
                    connection = %mask_connection_string(&command.connection_string),
                    "Query failed: {}",
                    e
                );
                QueryOutcome::failure(&command, e)
            }
        };

        if let Some(key) = &key {
            if outcome.is_success() {
                self.store(key, &outcome, command.cache.ttl).await;
            }
        }

        outcome
    }

    async fn get_ddl(&self, command: DdlCommand) -> DdlOutcome {
        let key = command.cache.enabled.then(|| {
            cache_keys::ddl_result(
                &command.connection_string,
                &command.db_type,
                &command.object_name,
                &command.object_type,
            )
        });

        if let Some(key) = &key {
            if let Some(mut outcome) = self.lookup::<DdlOutcome>(key).await {
                debug!("Serving DDL from cache");
                outcome.cached = true;
                return outcome;
            }
        }

        debug!(
            "Getting DDL for {} of type {} from {} database",
            command.object_name, command.object_type, command.db_type
        );

        let outcome = match self.run_ddl(&command).await {
            Ok(ddl) => DdlOutcome::success(&command, ddl),
            Err(e) => {
                warn!(
                    db_type = %command.db_type,
                    object = %command.object_name,
                    "DDL extraction failed: {}",
                    e
                );
                DdlOutcome::failure(&command, e)
            }
        };

        if let Some(key) = &key {
            if outcome.is_success() {
                self.store(key, &outcome, command.cache.ttl).await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CacheOptions, OutcomeStatus};
    use schemagate_connector::{DatabaseConnector, DbType, QueryExecutor};
    use schemagate_core::SchemaGateError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory cache for testing.
    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, (String, Duration)>>,
        broken: bool,
    }

    impl MemoryCache {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn insert(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), Duration::from_secs(60)));
        }

        fn entry(&self, key: &str) -> Option<(String, Duration)> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        fn fail_if_broken(&self) -> SchemaGateResult<()> {
            if self.broken {
                return Err(SchemaGateError::Cache("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CacheInterface for MemoryCache {
        async fn get_raw(&self, key: &str) -> SchemaGateResult<Option<String>> {
            self.fail_if_broken()?;
            Ok(self.entry(key).map(|(value, _)| value))
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> SchemaGateResult<()> {
            self.fail_if_broken()?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl));
            Ok(())
        }

        async fn delete(&self, key: &str) -> SchemaGateResult<bool> {
            self.fail_if_broken()?;
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn ping(&self) -> SchemaGateResult<()> {
            self.fail_if_broken()
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct Counters {
        connects: AtomicUsize,
        closes: AtomicUsize,
        statements: Mutex<Vec<String>>,
    }

    struct MockConnector {
        counters: Arc<Counters>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl QueryExecutor for MockConnector {
        async fn execute_query(&self, sql: &str) -> SchemaGateResult<QueryResult> {
            self.counters.statements.lock().unwrap().push(sql.to_string());
            match &self.fail_with {
                Some(message) => Err(SchemaGateError::database(message.clone())),
                None => Ok(QueryResult::affected(1)),
            }
        }
    }

    #[async_trait]
    impl DatabaseConnector for MockConnector {
        fn db_type(&self) -> DbType {
            DbType::Postgres
        }

        async fn get_ddl(&self, object_name: &str, object_type: &ObjectType) -> SchemaGateResult<String> {
            match &self.fail_with {
                Some(message) => Err(SchemaGateError::database(message.clone())),
                None => Ok(format!("-- {} {}", object_type, object_name)),
            }
        }

        async fn close(&self) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Mock connector factory for testing.
    #[derive(Default)]
    struct MockConnectorFactory {
        counters: Arc<Counters>,
        fail_with: Option<String>,
        refuse: bool,
    }

    impl MockConnectorFactory {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::default()
            }
        }

        fn connects(&self) -> usize {
            self.counters.connects.load(Ordering::SeqCst)
        }

        fn closes(&self) -> usize {
            self.counters.closes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConnectorFactory for MockConnectorFactory {
        async fn connect(
            &self,
            _db_type: DbType,
            _connection_string: &str,
        ) -> SchemaGateResult<Box<dyn DatabaseConnector>> {
            self.counters.connects.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return Err(SchemaGateError::connection("refused"));
            }
            Ok(Box::new(MockConnector {
                counters: Arc::clone(&self.counters),
                fail_with: self.fail_with.clone(),
            }))
        }
    }

    fn query(db_type: &str, cache_enabled: bool) -> QueryCommand {
        QueryCommand {
            connection_string: "host=db user=u password=p".to_string(),
            db_type: db_type.to_string(),
            query: "UPDATE t SET x = 1".to_string(),
            cache: CacheOptions {
                enabled: cache_enabled,
                ttl: Duration::from_secs(120),
            },
        }
    }

    fn ddl(cache_enabled: bool) -> DdlCommand {
        DdlCommand {
            connection_string: "host=db".to_string(),
            db_type: "postgres".to_string(),
            object_name: "users".to_string(),
            object_type: "table".to_string(),
            cache: CacheOptions {
                enabled: cache_enabled,
                ..CacheOptions::default()
            },
        }
    }

    fn service(
        factory: MockConnectorFactory,
        cache: MemoryCache,
    ) -> (DbServiceComponent, Arc<MockConnectorFactory>, Arc<MemoryCache>) {
        let factory = Arc::new(factory);
        let cache = Arc::new(cache);
        let service = DbServiceComponent::new(factory.clone(), cache.clone());
        (service, factory, cache)
    }

    #[tokio::test]
    async fn test_execute_query_without_cache() {
        let (service, factory, cache) = service(MockConnectorFactory::default(), MemoryCache::default());

        let outcome = service.execute_query(query("postgres", false)).await;

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.result.unwrap().affected_rows, 1);
        assert!(!outcome.cached);
        assert_eq!(factory.connects(), 1);
        assert_eq!(factory.closes(), 1);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_execute_query_cache_hit() {
        let (service, factory, cache) = service(MockConnectorFactory::default(), MemoryCache::default());

        let first = service.execute_query(query("postgres", true)).await;
        assert!(!first.cached);

        let key = cache_keys::query_result("host=db user=u password=p", "postgres", "UPDATE t SET x = 1");
        let (stored, ttl) = cache.entry(&key).unwrap();
        assert_eq!(ttl, Duration::from_secs(120));
        assert!(stored.contains("\"cached\":false"));

        let second = service.execute_query(query("postgres", true)).await;
        assert!(second.cached);
        assert_eq!(second.result, first.result);
        assert_eq!(factory.connects(), 1);
    }

    #[tokio::test]
    async fn test_database_error_becomes_payload_and_is_not_cached() {
        let (service, factory, cache) =
            service(MockConnectorFactory::failing("relation \"t\" does not exist"), MemoryCache::default());

        let outcome = service.execute_query(query("postgres", true)).await;

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert!(outcome.error.unwrap().contains("relation \"t\" does not exist"));
        assert_eq!(outcome.query, "UPDATE t SET x = 1");
        assert!(outcome.result.is_none());
        assert_eq!(factory.closes(), 1);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_db_type_is_error_payload() {
        let (service, factory, _cache) = service(MockConnectorFactory::default(), MemoryCache::default());

        let outcome = service.execute_query(query("mysql", false)).await;

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert_eq!(outcome.error.as_deref(), Some("Unsupported database type: mysql"));
        assert_eq!(outcome.db_type, "mysql");
        assert_eq!(factory.connects(), 0);
    }

    #[tokio::test]
    async fn test_connection_failure_is_error_payload() {
        let (service, factory, _cache) = service(MockConnectorFactory::refusing(), MemoryCache::default());

        let outcome = service.execute_query(query("fabric", false)).await;

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert_eq!(factory.closes(), 0);
    }

    #[tokio::test]
    async fn test_cache_failure_is_ignored() {
        let (service, factory, _cache) = service(MockConnectorFactory::default(), MemoryCache::broken());

        let outcome = service.execute_query(query("postgres", true)).await;

        assert!(outcome.is_success());
        assert!(!outcome.cached);
        assert_eq!(factory.connects(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_is_replaced() {
        let (service, factory, cache) = service(MockConnectorFactory::default(), MemoryCache::default());
        let key = cache_keys::query_result("host=db user=u password=p", "postgres", "UPDATE t SET x = 1");
        cache.insert(&key, "not json");

        let outcome = service.execute_query(query("postgres", true)).await;

        assert!(outcome.is_success());
        assert!(!outcome.cached);
        assert_eq!(factory.connects(), 1);
        let (stored, _) = cache.entry(&key).unwrap();
        assert!(stored.starts_with('{'));
    }

    #[tokio::test]
    async fn test_get_ddl_cached_round_trip() {
        let (service, factory, cache) = service(MockConnectorFactory::default(), MemoryCache::default());

        let first = service.get_ddl(ddl(true)).await;
        assert_eq!(first.ddl.as_deref(), Some("-- table users"));
        assert_eq!(first.object_type, "table");

        let (_, ttl) = cache.entry(&cache_keys::ddl_result("host=db", "postgres", "users", "table")).unwrap();
        assert_eq!(ttl, Duration::from_secs(3600));

        let second = service.get_ddl(ddl(true)).await;
        assert!(second.cached);
        assert_eq!(second.ddl, first.ddl);
        assert_eq!(factory.connects(), 1);
        assert_eq!(factory.closes(), 1);
    }

    #[tokio::test]
    async fn test_get_ddl_failure_payload() {
        let (service, _factory, cache) = service(MockConnectorFactory::failing("boom"), MemoryCache::default());

        let outcome = service.get_ddl(ddl(true)).await;

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert_eq!(outcome.object_name, "users");
        assert!(outcome.ddl.is_none());
        assert_eq!(cache.len(), 0);
    }
}
