//! Configuration module for Socksguard
//!
//! This module provides configuration types and parsing for the server.

mod server;
mod store;

pub use server::{Config, ServerConfig};
pub use store::{StoreBackend, StoreConfig};

use crate::error::SocksguardError;
use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(SocksguardError::Io)
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:1080");
        assert!(!config.server.auth_required);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[server]
listen_addr = "127.0.0.1:1081"
auth_required = true
lookup_timeout = 5
reply_on_rejection = true

[store]
backend = "memory"
path = "/var/lib/socksguard"
salt = "storage-salt"
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:1081");
        assert!(config.server.auth_required);
        assert_eq!(config.server.lookup_timeout, 5);
        assert!(config.server.reply_on_rejection);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.path, PathBuf::from("/var/lib/socksguard"));
        assert_eq!(config.store.salt, "storage-salt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_unknown_backend() {
        let config_str = r#"
[store]
backend = "postgres"
"#;
        assert!(parse_config(config_str).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/socksguard.toml").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SocksguardError>(),
            Some(SocksguardError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("socksguard.toml");
        std::fs::write(&path, "[server]\nlisten_addr = \"127.0.0.1:9050\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9050");
    }
}
