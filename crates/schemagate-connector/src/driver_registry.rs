//! ODBC driver registration lookup.
//!
//! Drivers are listed by the driver manager (`SQLDrivers`), which honours
//! `ODBCSYSINI`/`ODBCINSTINI`. Reading `odbcinst.ini` directly is the
//! fallback when no ODBC environment can be created.

use crate::odbc::shared_environment;
use async_trait::async_trait;
use odbc_api::DriverInfo;
use schemagate_config::DatabaseConfig;
use schemagate_core::{HealthCheck, HealthStatus, SchemaGateError, SchemaGateResult};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drivers registered with the unixODBC driver manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OdbcDriverRegistry {
    drivers: BTreeMap<String, BTreeMap<String, String>>,
}

impl OdbcDriverRegistry {
    /// Parses the contents of an `odbcinst.ini` file.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut drivers: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = section.trim().to_string();
                drivers.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
                if let Some(entries) = drivers.get_mut(section) {
                    entries.insert(key.trim().to_lowercase(), value.trim().to_string());
                }
            }
        }

        // [ODBC] holds driver manager settings, not a driver
        drivers.remove("ODBC");
        Self { drivers }
    }

    /// Builds the registry from the driver manager's driver list.
    #[must_use]
    pub fn from_driver_infos(infos: impl IntoIterator<Item = DriverInfo>) -> Self {
        let drivers = infos
            .into_iter()
            .map(|info| {
                let attributes: BTreeMap<String, String> = info
                    .attributes
                    .into_iter()
                    .map(|(key, value)| (key.to_lowercase(), value))
                    .collect();
                (info.description, attributes)
            })
            .collect();
        Self { drivers }
    }

    /// Asks the driver manager for the installed drivers.
    pub fn from_driver_manager() -> SchemaGateResult<Self> {
        let infos = shared_environment()?.drivers().map_err(|e| {
            SchemaGateError::Configuration(format!("Cannot list ODBC drivers: {}", e))
        })?;
        Ok(Self::from_driver_infos(infos))
    }

    /// Reads and parses an `odbcinst.ini` file.
    pub fn load(path: impl AsRef<Path>) -> SchemaGateResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SchemaGateError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&contents))
    }

    /// Returns true when a driver section with this exact name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Returns the shared library path registered for a driver.
    #[must_use]
    pub fn driver_path(&self, name: &str) -> Option<&str> {
        self.drivers.get(name)?.get("driver").map(String::as_str)
    }

    /// Returns the registered driver names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }
}

/// Where the list of drivers came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverSource {
    /// The ODBC driver manager.
    DriverManager,
    /// An `odbcinst.ini` file read directly.
    File(PathBuf),
}

impl fmt::Display for DriverSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DriverManager => write!(f, "the ODBC driver manager"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How registered drivers are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverLookup {
    /// Ask the driver manager, reading `fallback` if it is unavailable.
    DriverManager {
        /// `odbcinst.ini` read when no ODBC environment can be created.
        fallback: PathBuf,
    },
    /// Read an `odbcinst.ini` file only.
    File(PathBuf),
}

impl DriverLookup {
    /// Lists the registered drivers and where they were found.
    pub fn resolve(&self) -> SchemaGateResult<(OdbcDriverRegistry, DriverSource)> {
        match self {
            Self::DriverManager { fallback } => {
                discover_with(OdbcDriverRegistry::from_driver_manager, fallback)
            }
            Self::File(path) => {
                OdbcDriverRegistry::load(path).map(|r| (r, DriverSource::File(path.clone())))
            }
        }
    }
}

impl From<&DatabaseConfig> for DriverLookup {
    fn from(config: &DatabaseConfig) -> Self {
        let path = PathBuf::from(&config.odbcinst_path);
        if config.use_driver_manager {
            Self::DriverManager { fallback: path }
        } else {
            Self::File(path)
        }
    }
}

fn discover_with(
    query: impl FnOnce() -> SchemaGateResult<OdbcDriverRegistry>,
    fallback: &Path,
) -> SchemaGateResult<(OdbcDriverRegistry, DriverSource)> {
    match query() {
        Ok(registry) => Ok((registry, DriverSource::DriverManager)),
        Err(e) => {
            debug!("{}; reading {} instead", e, fallback.display());
            OdbcDriverRegistry::load(fallback).map(|r| (r, DriverSource::File(fallback.to_path_buf())))
        }
    }
}

/// Readiness check for the SQL Server ODBC driver.
///
/// A missing driver only degrades the service: PostgreSQL keeps working.
#[derive(Debug, Clone)]
pub struct OdbcDriverCheck {
    lookup: DriverLookup,
    driver_name: String,
}

impl OdbcDriverCheck {
    /// Creates a check for `driver_name`.
    #[must_use]
    pub fn new(lookup: DriverLookup, driver_name: impl Into<String>) -> Self {
        Self {
            lookup,
            driver_name: driver_name.into(),
        }
    }

    /// Looks the driver up and describes the outcome.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        match self.lookup.resolve() {
            Ok((registry, _)) if registry.contains(&self.driver_name) => HealthStatus::Healthy,
            Ok((_, source)) => HealthStatus::Degraded(format!(
                "ODBC driver '{}' is not registered in {}",
                self.driver_name, source
            )),
            Err(e) => HealthStatus::Degraded(e.to_string()),
        }
    }
}

#[async_trait]
impl HealthCheck for OdbcDriverCheck {
    fn name(&self) -> &str {
        "odbc_driver"
    }

    async fn check(&self) -> HealthStatus {
        self.status()
    }
}
