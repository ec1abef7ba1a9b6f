//! Configuration for the currency service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the RocksDB-backed stores
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// gRPC listen address
    pub grpc_listen_addr: String,

    /// Metrics listen address
    pub metrics_listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/currencies"),
            service_name: "currency-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            grpc_listen_addr: "0.0.0.0:50051".to_string(),
            metrics_listen_addr: "0.0.0.0:9090".to_string(),
        }
    }
}

impl Config {
    /// Directory holding currency revisions
    pub fn currency_store_path(&self) -> PathBuf {
        self.data_dir.join("currencies")
    }

    /// Directory holding denomination revisions
    pub fn denomination_store_path(&self) -> PathBuf {
        self.data_dir.join("denominations")
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Internal(format!("Failed to read config: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Internal(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("CURRENCY_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(addr) = std::env::var("CURRENCY_GRPC_ADDR") {
            config.grpc_listen_addr = addr;
        }

        if let Ok(addr) = std::env::var("CURRENCY_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "currency-service");
        assert_eq!(config.grpc_listen_addr, "0.0.0.0:50051");
    }

    #[test]
    fn test_store_paths_are_disjoint() {
        let config = Config::default();
        assert_ne!(
            config.currency_store_path(),
            config.denomination_store_path()
        );
    }
}
