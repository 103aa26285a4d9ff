//! Credential storage
//!
//! Maps logins to salted password verifiers. Backends implement
//! [`CredentialStore`] and are shared across all connection tasks, so every
//! implementation must be safe for concurrent lookups.
//!
//! Deadlines are applied by the caller wrapping a store future in
//! `tokio::time::timeout`; backends must tolerate being dropped mid-call.

mod hash;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use hash::{PasswordHash, PasswordHasher};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// A stored credential: the login and its password verifier.
///
/// Never carries the plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    login: String,
    verifier: PasswordHash,
}

impl Credential {
    pub(crate) fn new(login: String, verifier: PasswordHash) -> Self {
        Credential { login, verifier }
    }

    /// The unique login
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Consume the credential, keeping only the login
    pub fn into_login(self) -> String {
        self.login
    }

    pub(crate) fn verifier(&self) -> &PasswordHash {
        &self.verifier
    }
}

/// Durable, hash-verified credential lookup and provisioning
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Short backend name for logs (e.g. "sqlite")
    fn backend(&self) -> &str;

    /// Find the credential whose login and verifier both match.
    ///
    /// An unknown login and a wrong password both yield
    /// [`StoreError::NotFound`].
    async fn lookup(&self, login: &str, password: &[u8]) -> Result<Credential, StoreError>;

    /// Persist a new credential.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the login is taken.
    async fn create(&self, login: &str, password: &[u8]) -> Result<Credential, StoreError>;
}

/// Open the backend selected by the configuration
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn CredentialStore>> {
    let hasher = PasswordHasher::new(config.salt.clone());

    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new(hasher))),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&config.path, hasher)
                .await
                .map_err(crate::error::SocksguardError::Store)
                .with_context(|| format!("Failed to open SQLite store in {:?}", config.path))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => {
            anyhow::bail!("SQLite store is not enabled. Recompile with --features sqlite")
        }
    }
}

pub(crate) fn validate_login(login: &str) -> Result<(), StoreError> {
    if login.is_empty() {
        return Err(StoreError::InvalidLogin);
    }
    Ok(())
}
