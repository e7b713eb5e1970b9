use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::SupplyChainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Row counts for the dummy data generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub suppliers: usize,
    pub products: usize,
    pub warehouses: usize,
    pub orders: usize,
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            suppliers: 5,
            products: 5,
            warehouses: 5,
            orders: 10,
            rng_seed: None,
        }
    }
}

fn default_database_url() -> String {
    "sqlite://supply_chain.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            seed: SeedConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: optional TOML file named by `SUPPLY_CHAIN_CONFIG`,
    /// then environment overrides.
    pub fn load() -> Result<Self, SupplyChainError> {
        let mut config = match env::var("SUPPLY_CHAIN_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(database_url) = env::var("DATABASE_URL") {
            config.database_url = database_url;
        }

        if let Ok(max_connections) = env::var("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = max_connections.parse().map_err(|e| {
                SupplyChainError::ConfigError(format!(
                    "DATABASE_MAX_CONNECTIONS must be a positive integer: {}",
                    e
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SupplyChainError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SupplyChainError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SupplyChainError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SupplyChainError> {
        if self.database_url.trim().is_empty() {
            return Err(SupplyChainError::ConfigError(
                "database_url must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(SupplyChainError::ConfigError(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database_url, "sqlite://supply_chain.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.seed.orders, 10);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            database_url = "sqlite://reports.db"

            [seed]
            suppliers = 3
            products = 4
            warehouses = 2
            orders = 20
            rng_seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url, "sqlite://reports.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.seed.orders, 20);
        assert_eq!(config.seed.rng_seed, Some(7));
    }

    #[test]
    fn test_zero_connections_rejected() {
        let err = AppConfig::from_toml_str("max_connections = 0").unwrap_err();
        assert!(matches!(err, SupplyChainError::ConfigError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = \"sqlite::memory:\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/supply_chain.toml").unwrap_err();
        assert!(matches!(err, SupplyChainError::ConfigError(_)));
    }
}
