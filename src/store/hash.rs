//! Salted password verifiers
//!
//! A verifier is the lowercase hex SHA-256 of `password || salt`. One salt is
//! shared by every credential in a store instance.

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Opaque password verifier as persisted by a store
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a verifier read back from storage
    pub(crate) fn from_stored(hex: String) -> Self {
        PasswordHash(hex)
    }

    /// Hex form of the verifier
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare two verifiers without short-circuiting on the first mismatch
    pub(crate) fn matches(&self, other: &PasswordHash) -> bool {
        constant_time_compare(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Hashes plaintext passwords with the store-wide salt
#[derive(Clone)]
pub struct PasswordHasher {
    salt: Arc<str>,
}

impl PasswordHasher {
    /// Create a hasher for the given salt
    pub fn new(salt: impl Into<String>) -> Self {
        PasswordHasher {
            salt: Arc::from(salt.into()),
        }
    }

    /// Compute the verifier for a plaintext password
    pub fn hash(&self, password: &[u8]) -> PasswordHash {
        let digest = Sha256::new()
            .chain_update(password)
            .chain_update(self.salt.as_bytes())
            .finalize();

        PasswordHash(hex::encode(digest))
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("salt", &"<redacted>")
            .finish()
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
