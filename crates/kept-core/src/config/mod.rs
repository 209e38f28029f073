//! Store configuration.
//!
//! Selects which backing collaborator a [`NoteStore`](crate::store::NoteStore)
//! talks to and tunes history depth, persistence timeout and trash retention.
//! Values come from the environment (`KEPT_*`) or from an explicit lookup for
//! tests; frontends may override individual fields afterwards.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

/// Actions kept in the undo log before the oldest is dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Days a note stays in the trash before it may be purged.
pub const DEFAULT_TRASH_RETENTION_DAYS: i64 = 7;
const DEFAULT_PERSIST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_FILE: &str = "kept.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which persistence mechanism backs the store. Exactly one per store instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Durable local key-value database file
    Local { db_path: PathBuf },
    /// Remote HTTP notes service
    Remote { base_url: String },
    /// Process memory only; nothing survives exit
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendConfig,
    pub history_limit: usize,
    pub persist_timeout: Duration,
    pub trash_retention: chrono::Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Local {
                db_path: PathBuf::from(DEFAULT_DB_FILE),
            },
            history_limit: DEFAULT_HISTORY_LIMIT,
            persist_timeout: Duration::from_secs(DEFAULT_PERSIST_TIMEOUT_SECS),
            trash_retention: chrono::Duration::days(DEFAULT_TRASH_RETENTION_DAYS),
        }
    }
}

impl StoreConfig {
    /// In-memory store with default tuning, mostly for tests.
    pub fn in_memory() -> Self {
        Self {
            backend: BackendConfig::Memory,
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    /// Build a config from `KEPT_*` variables.
    ///
    /// `KEPT_API_URL` wins over `KEPT_DB_PATH`: when a remote service is
    /// configured the local database is not opened.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base_url) = normalize_text_option(lookup("KEPT_API_URL")) {
            config.backend = BackendConfig::remote(&base_url)?;
        } else if let Some(db_path) = normalize_text_option(lookup("KEPT_DB_PATH")) {
            config.backend = BackendConfig::Local {
                db_path: PathBuf::from(db_path),
            };
        }

        if let Some(raw) = normalize_text_option(lookup("KEPT_HISTORY_LIMIT")) {
            config.history_limit = raw
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "KEPT_HISTORY_LIMIT must be a positive integer, got '{raw}'"
                    ))
                })?;
        }

        if let Some(raw) = normalize_text_option(lookup("KEPT_PERSIST_TIMEOUT_SECS")) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "KEPT_PERSIST_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    ))
                })?;
            config.persist_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

impl BackendConfig {
    /// Validate and normalize a remote base URL.
    pub fn remote(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.trim();
        if !is_http_url(base_url) {
            return Err(ConfigError::Invalid(
                "KEPT_API_URL must start with http:// or https://".to_string(),
            ));
        }
        Ok(Self::Remote {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Remote { .. } => "remote",
            Self::Memory => "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        StoreConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn defaults_to_local_backend() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.trash_retention, chrono::Duration::days(7));
        assert!(matches!(config.backend, BackendConfig::Local { .. }));
    }

    #[test]
    fn remote_url_wins_and_is_normalized() {
        let config = config_from(&[
            ("KEPT_API_URL", " http://localhost:6727/ "),
            ("KEPT_DB_PATH", "/tmp/ignored.db"),
        ])
        .unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Remote {
                base_url: "http://localhost:6727".to_string()
            }
        );
    }

    #[test]
    fn remote_url_requires_http_scheme() {
        let error = config_from(&[("KEPT_API_URL", "localhost:6727")]).unwrap_err();
        assert!(error.to_string().contains("KEPT_API_URL"));
    }

    #[test]
    fn rejects_zero_history_limit() {
        assert!(config_from(&[("KEPT_HISTORY_LIMIT", "0")]).is_err());
        let config = config_from(&[("KEPT_HISTORY_LIMIT", "5")]).unwrap();
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn parses_persist_timeout() {
        let config = config_from(&[("KEPT_PERSIST_TIMEOUT_SECS", "3")]).unwrap();
        assert_eq!(config.persist_timeout, Duration::from_secs(3));
        assert!(config_from(&[("KEPT_PERSIST_TIMEOUT_SECS", "soon")]).is_err());
    }
}
