//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve where the content store lives for the current environment.
//! - Resolve logging level and directory for the composition root.
//!
//! # Invariants
//! - `test` environments always use an in-memory store.
//! - `prod` environments never fall back to a default database path.

use crate::logging::default_log_level;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_VAR: &str = "FOLIO_ENV";
pub const DB_PATH_VAR: &str = "FOLIO_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "FOLIO_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "FOLIO_LOG_DIR";

const DEV_DB_PATH: &str = "folio_dev.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported FOLIO_ENV value `{0}`; expected dev|test|prod")]
    UnknownEnvironment(String),
    #[error("FOLIO_DB_PATH must be set when FOLIO_ENV=prod")]
    MissingDatabasePath,
}

/// Deployment environment selected by `FOLIO_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Where the SQLite store is opened from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolioConfig {
    pub environment: Environment,
    pub store: StoreLocation,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<String>,
}

impl FolioConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let environment = match get(ENV_VAR) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::default(),
        };

        let store = match (environment, get(DB_PATH_VAR)) {
            (Environment::Test, _) => StoreLocation::Memory,
            (_, Some(path)) => StoreLocation::File(PathBuf::from(path)),
            (Environment::Dev, None) => StoreLocation::File(PathBuf::from(DEV_DB_PATH)),
            (Environment::Prod, None) => return Err(ConfigError::MissingDatabasePath),
        };

        Ok(Self {
            environment,
            store,
            log_level: get(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: get(LOG_DIR_VAR),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Environment, FolioConfig, StoreLocation};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<FolioConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        FolioConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_dev_file_store() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Dev);
        assert_eq!(
            config.store,
            StoreLocation::File(PathBuf::from("folio_dev.db"))
        );
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_environment_ignores_db_path() {
        let config = config_from(&[("FOLIO_ENV", "TEST"), ("FOLIO_DB_PATH", "/tmp/x.db")]).unwrap();
        assert_eq!(config.store, StoreLocation::Memory);
    }

    #[test]
    fn prod_requires_db_path() {
        let err = config_from(&[("FOLIO_ENV", "prod"), ("FOLIO_DB_PATH", "  ")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingDatabasePath);

        let config = config_from(&[("FOLIO_ENV", "prod"), ("FOLIO_DB_PATH", "/srv/folio.db")])
            .unwrap();
        assert_eq!(
            config.store,
            StoreLocation::File(PathBuf::from("/srv/folio.db"))
        );
    }

    #[test]
    fn rejects_unknown_environment() {
        let err = config_from(&[("FOLIO_ENV", "staging")]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownEnvironment("staging".to_string()));
    }

    #[test]
    fn log_settings_are_passed_through() {
        let config = config_from(&[
            ("FOLIO_LOG_LEVEL", "warn"),
            ("FOLIO_LOG_DIR", "/var/log/folio"),
        ])
        .unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/folio"));
    }
}
