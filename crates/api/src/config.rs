//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context};

use invadj_adjustments::SaveOptions;
use invadj_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Which record store backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    /// JSON catalog registered at startup.
    pub seed_file: Option<PathBuf>,
    pub save_options: SaveOptions,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source (the environment in prod).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8080")?;

        let store = if parse_flag(&get, "USE_PERSISTENT_STORES")? {
            let database_url = get("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true"))?;
            StoreBackend::Postgres { database_url }
        } else {
            StoreBackend::InMemory
        };

        let seed_file = get("SEED_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let save_options = SaveOptions {
            enable_sourcing: parse_flag(&get, "ENABLE_SOURCING")?,
            ignore_mandatory_fields: !parse_flag(&get, "ENFORCE_MANDATORY_FIELDS")?,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse::<LogFormat>().map_err(|e| anyhow!("LOG_FORMAT: {e}"))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            store,
            seed_file,
            save_options,
            log_format,
        })
    }
}

fn parse_flag(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<bool> {
    match get(key) {
        None => Ok(false),
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "" | "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow!("{key} must be true or false, got {other:?}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.store, StoreBackend::InMemory);
        assert_eq!(config.seed_file, None);
        assert_eq!(config.save_options, SaveOptions::relaxed());
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn persistent_store_requires_database_url() {
        let err = config_from(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let config = config_from(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/invadj"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/invadj".to_string()
            }
        );
    }

    #[test]
    fn save_flags() {
        let config = config_from(&[
            ("ENFORCE_MANDATORY_FIELDS", "yes"),
            ("ENABLE_SOURCING", "1"),
        ])
        .unwrap();
        assert!(!config.save_options.ignore_mandatory_fields);
        assert!(config.save_options.enable_sourcing);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(config_from(&[("BIND_ADDR", "localhost")]).is_err());
        assert!(config_from(&[("ENABLE_SOURCING", "maybe")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
