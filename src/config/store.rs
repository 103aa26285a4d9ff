//! Credential store configuration
//!
//! Selects the storage backend and carries the store-wide salt.

use crate::error::SocksguardError;
use crate::helper::DEFAULT_STORE_PATH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default store directory
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Credential storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StoreBackend {
    /// SQLite database file under [`StoreConfig::path`]
    #[default]
    #[serde(rename = "sqlite")]
    Sqlite,
    /// Process-local map, lost on exit
    #[serde(rename = "memory")]
    Memory,
}

/// Credential store configuration
#[derive(Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory containing `storage.db` (and optionally `scheme.sql`)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Salt appended to every password before hashing
    #[serde(default)]
    pub salt: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            salt: String::new(),
        }
    }
}

// The salt stays out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("path", &self.path)
            .field("salt", &"<redacted>")
            .finish()
    }
}

impl StoreConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SocksguardError> {
        if self.salt.is_empty() {
            return Err(SocksguardError::Config(
                "store salt must be configured when authentication is enabled".to_string(),
            ));
        }
        if self.backend == StoreBackend::Sqlite && self.path.as_os_str().is_empty() {
            return Err(SocksguardError::Config(
                "store path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::Sqlite);
        assert_eq!(config.path, PathBuf::from("storage"));
        assert!(config.salt.is_empty());
    }

    #[test]
    fn test_store_config_validate() {
        let config = StoreConfig {
            salt: "pepper".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = StoreConfig {
            salt: "pepper".to_string(),
            path: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            backend: StoreBackend::Memory,
            salt: "pepper".to_string(),
            path: PathBuf::new(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_config_debug_hides_salt() {
        let config = StoreConfig {
            salt: "very-secret-salt".to_string(),
            ..Default::default()
        };
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("StoreConfig"));
        assert!(!debug_str.contains("very-secret-salt"));
    }
}
