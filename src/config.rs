use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

// ============================================================================
// Configuration
// ============================================================================
//
// Read from the environment at startup. Unset variables fall back to
// defaults; set but unparsable values are an error.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Scylla,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scylla" => Ok(StoreBackend::Scylla),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}' (expected scylla or memory)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub scylla_uri: String,
    pub scylla_keyspace: String,
    pub store_timeout: Duration,
    pub htpasswd_path: PathBuf,
    /// Include error detail on 500 pages.
    pub development: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let keyspace: String = load(&lookup, "SCYLLA_KEYSPACE", "registration_form")?;
        if !is_cql_identifier(&keyspace) {
            return Err(ConfigError::Invalid {
                key: "SCYLLA_KEYSPACE",
                value: keyspace,
                reason: "must start with a letter and contain only letters, digits or '_' (max 48)"
                    .to_string(),
            });
        }

        let environment: String = load(&lookup, "APP_ENV", "production")?;
        let timeout_ms: u64 = load(&lookup, "STORE_TIMEOUT_MS", "5000")?;

        Ok(Self {
            bind_address: load(&lookup, "BIND_ADDRESS", "0.0.0.0")?,
            port: load(&lookup, "PORT", "3000")?,
            store_backend: load(&lookup, "STORE_BACKEND", "scylla")?,
            scylla_uri: load(&lookup, "SCYLLA_URI", "127.0.0.1:9042")?,
            scylla_keyspace: keyspace,
            store_timeout: Duration::from_millis(timeout_ms),
            htpasswd_path: load(&lookup, "HTPASSWD_PATH", "users.htpasswd")?,
            development: environment.eq_ignore_ascii_case("development"),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

fn is_cql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    name.len() <= 48
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.address(), "0.0.0.0:3000");
        assert_eq!(config.store_backend, StoreBackend::Scylla);
        assert_eq!(config.scylla_uri, "127.0.0.1:9042");
        assert_eq!(config.scylla_keyspace, "registration_form");
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.htpasswd_path, PathBuf::from("users.htpasswd"));
        assert!(!config.development);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("STORE_BACKEND", "Memory"),
            ("STORE_TIMEOUT_MS", "250"),
            ("APP_ENV", "development"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert!(config.development);
    }

    #[test]
    fn test_invalid_port() {
        let result = config_from(&[("PORT", "eighty")]);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));
    }

    #[test]
    fn test_unknown_backend() {
        let result = config_from(&[("STORE_BACKEND", "mongo")]);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "STORE_BACKEND", .. })));
    }

    #[test]
    fn test_keyspace_must_be_identifier() {
        let result = config_from(&[("SCYLLA_KEYSPACE", "ks; DROP TABLE x")]);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "SCYLLA_KEYSPACE", .. })));

        assert!(config_from(&[("SCYLLA_KEYSPACE", "reg_2024")]).is_ok());
    }
}
