use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use kept_core::config::DEFAULT_TRASH_RETENTION_DAYS;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub trash_retention: chrono::Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "KEPT_API_BIND_ADDR", "127.0.0.1:6727");
        let db_path = PathBuf::from(value_or_default(
            &lookup,
            "KEPT_API_DB_PATH",
            "kept-api.db",
        ));

        let retention_days = value_or_default(
            &lookup,
            "KEPT_TRASH_RETENTION_DAYS",
            &DEFAULT_TRASH_RETENTION_DAYS.to_string(),
        )
        .parse::<i64>()
        .map_err(|_| {
            ConfigError::Invalid("KEPT_TRASH_RETENTION_DAYS must be an integer in [1, 365]".to_string())
        })?;
        if !(1..=365).contains(&retention_days) {
            return Err(ConfigError::Invalid(
                "KEPT_TRASH_RETENTION_DAYS must be in [1, 365]".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            db_path,
            trash_retention: chrono::Duration::days(retention_days),
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn config_defaults_to_local_port() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:6727");
        assert_eq!(config.db_path, PathBuf::from("kept-api.db"));
        assert_eq!(config.trash_retention.num_days(), 7);
    }

    #[test]
    fn config_reads_overrides() {
        let config = config_from(&[
            ("KEPT_API_BIND_ADDR", " 0.0.0.0:9000 "),
            ("KEPT_API_DB_PATH", "/var/lib/kept/api.db"),
            ("KEPT_TRASH_RETENTION_DAYS", "30"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/kept/api.db"));
        assert_eq!(config.trash_retention.num_days(), 30);
    }

    #[test]
    fn config_rejects_bad_retention() {
        let err = config_from(&[("KEPT_TRASH_RETENTION_DAYS", "0")]).unwrap_err();
        assert!(err.to_string().contains("KEPT_TRASH_RETENTION_DAYS"));

        assert!(config_from(&[("KEPT_TRASH_RETENTION_DAYS", "week")]).is_err());
    }
}
