//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const APP_NAME: &str = "care-registry";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_ADDR: &str = "CARE_REGISTRY_ADDR";
pub const ENV_DB: &str = "CARE_REGISTRY_DB";
pub const ENV_LOG: &str = "CARE_REGISTRY_LOG";

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_LOG_FILTER: &str = "info,care_registry_server=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

/// Default database location: `<local data dir>/care-registry/registry.db`,
/// or the working directory when the platform has no data dir.
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("registry.db")
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(ENV_ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: ENV_ADDR,
            value: addr.clone(),
        })?;

        let database_path = match lookup(ENV_DB) {
            Some(path) if path.trim().is_empty() => return Err(ConfigError::Empty { var: ENV_DB }),
            Some(path) => PathBuf::from(path),
            None => default_database_path(),
        };

        let log_filter = lookup(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            bind_addr,
            database_path,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8000");
        assert!(config.database_path.ends_with("care-registry/registry.db"));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn overrides_apply() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_ADDR, "0.0.0.0:9000"),
            (ENV_DB, "/tmp/registry-test.db"),
            (ENV_LOG, "warn"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_path, PathBuf::from("/tmp/registry-test.db"));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn invalid_addr_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_ADDR, "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddr { .. }));
    }

    #[test]
    fn empty_db_path_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_DB, " ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty { var: ENV_DB }));
    }
}
