//! Server configuration types
//!
//! Defines the root configuration and the listener/negotiation settings.

use super::StoreConfig;
use crate::error::SocksguardError;
use crate::helper::{DEFAULT_LISTEN_ADDR, DEFAULT_LOOKUP_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default listen address
fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

/// Default credential lookup timeout in seconds
fn default_lookup_timeout() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Listener and negotiation settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Credential store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Validate the whole configuration
    pub fn validate(&self) -> Result<(), SocksguardError> {
        self.server.validate()?;
        if self.server.auth_required {
            self.store.validate()?;
        }
        Ok(())
    }
}

/// SOCKS5 listener configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to accept client connections on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Require username/password authentication (opens the credential store)
    #[serde(default)]
    pub auth_required: bool,

    /// Credential lookup timeout in seconds
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout: u64,

    /// Send `[0x05, 0xFF]` before closing when no method is acceptable
    #[serde(default)]
    pub reply_on_rejection: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            auth_required: false,
            lookup_timeout: default_lookup_timeout(),
            reply_on_rejection: false,
        }
    }
}

impl ServerConfig {
    /// Credential lookup timeout as a [`Duration`]
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SocksguardError> {
        if self.listen_addr.trim().is_empty() {
            return Err(SocksguardError::Config(
                "listen_addr must not be empty".to_string(),
            ));
        }
        if self.lookup_timeout == 0 {
            return Err(SocksguardError::Config(
                "lookup_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
