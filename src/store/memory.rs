//! In-memory credential store
//!
//! Keeps credentials in a process-local map. Contents are lost on exit.

use super::{validate_login, Credential, CredentialStore, PasswordHasher};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Credential store backed by a `HashMap` behind a read-write lock
#[derive(Debug)]
pub struct MemoryStore {
    hasher: PasswordHasher,
    credentials: RwLock<HashMap<String, Credential>>,
}

impl MemoryStore {
    /// Create an empty store using the given hasher
    pub fn new(hasher: PasswordHasher) -> Self {
        MemoryStore {
            hasher,
            credentials: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored credentials
    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    /// Whether the store holds no credentials
    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn lookup(&self, login: &str, password: &[u8]) -> Result<Credential, StoreError> {
        let candidate = self.hasher.hash(password);
        let credentials = self.credentials.read().await;

        match credentials.get(login) {
            Some(credential) if credential.verifier().matches(&candidate) => {
                Ok(credential.clone())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn create(&self, login: &str, password: &[u8]) -> Result<Credential, StoreError> {
        validate_login(login)?;
        let verifier = self.hasher.hash(password);

        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(login) {
            return Err(StoreError::AlreadyExists(login.to_string()));
        }

        let credential = Credential::new(login.to_string(), verifier);
        credentials.insert(login.to_string(), credential.clone());
        tracing::debug!(login = ?login, "Credential created in memory store");
        Ok(credential)
    }
}
