//! Configuration management for hashledger

use crate::error::ChainError;
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Config file read by the node binary unless `--config` says otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            api_port: default_api_port(),
        }
    }
}

impl NetworkConfig {
    /// The address the HTTP API binds to.
    pub fn api_addr(&self) -> Result<SocketAddr, ChainError> {
        let ip: IpAddr = self.api_host.trim().parse().map_err(|e| {
            ChainError::Config(format!("Invalid network.api_host {:?}: {}", self.api_host, e))
        })?;
        Ok(SocketAddr::new(ip, self.api_port))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MinerConfig {
    /// Recipient of mining rewards; a random identifier is generated when unset.
    #[serde(default)]
    pub node_identifier: Option<String>,
}

impl Config {
    /// Check values that would otherwise only fail once the node is serving.
    pub fn validate(&self) -> Result<(), ChainError> {
        self.network.api_addr()?;

        if self.network.api_port == 0 {
            return Err(ChainError::Config("network.api_port must be non-zero".to_string()));
        }

        if let Some(id) = &self.miner.node_identifier {
            if id.trim().is_empty() {
                return Err(ChainError::Config(
                    "miner.node_identifier must not be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Load a config file, falling back to defaults when it does not exist.
/// `PORT` in the environment overrides `network.api_port`.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    let mut config: Config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        tracing::debug!("no config at {}, using defaults", path.display());
        Config::default()
    };

    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        config.network.api_port = port;
    }

    config.validate()?;
    Ok(config)
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network.api_host, "0.0.0.0");
        assert_eq!(config.network.api_port, 5000);
        assert!(config.miner.node_identifier.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[miner]\nnode_identifier = \"abc\"\n").unwrap();
        assert_eq!(config.network.api_port, 5000);
        assert_eq!(config.miner.node_identifier.as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\napi_host = \"127.0.0.1\"\napi_port = 8081").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.network.api_host, "127.0.0.1");
        if std::env::var("PORT").is_err() {
            assert_eq!(config.network.api_port, 8081);
        }
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.network.api_host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.network.api_port = 0;
        assert!(matches!(config.validate(), Err(ChainError::Config(_))));

        let mut config = Config::default();
        config.miner.node_identifier = Some("   ".to_string());
        assert!(matches!(config.validate(), Err(ChainError::Config(_))));

        let mut config = Config::default();
        config.network.api_host = "not-an-ip".to_string();
        assert!(matches!(config.validate(), Err(ChainError::Config(_))));
    }

    #[test]
    fn test_api_addr() {
        let mut config = Config::default();
        config.network.api_host = "127.0.0.1".to_string();
        config.network.api_port = 8081;
        assert_eq!(
            config.network.api_addr().unwrap(),
            "127.0.0.1:8081".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_malformed_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\napi_port = \"not a port\"").unwrap();
        assert!(matches!(load_config_from(file.path()), Err(ChainError::Config(_))));
    }
}
