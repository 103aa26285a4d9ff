//! Error types for Socksguard
//!
//! This module defines all custom error types used throughout the application.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Socksguard operations
#[derive(Error, Debug)]
pub enum SocksguardError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while negotiating a SOCKS5 handshake.
///
/// Every variant aborts the connection it was raised on and nothing else.
#[derive(Error, Debug)]
pub enum HandshakeError {
    /// The first header byte was not SOCKS version 5
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// The client advertised zero authentication methods
    #[error("Client offered no authentication methods")]
    NoMethods,

    /// The connection ended before the 2-byte header was read
    #[error("Truncated handshake header")]
    TruncatedHeader,

    /// The connection ended before all advertised method bytes were read
    #[error("Truncated method list: expected {expected} bytes")]
    TruncatedMethods {
        /// Number of method bytes announced by the header
        expected: usize,
    },

    /// A credential store is configured but the client cannot authenticate
    #[error("Authentication required but client does not offer username/password")]
    AuthRequired,

    /// Client offered neither of the methods the server supports
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// The connection ended inside a length-delimited credential field
    #[error("Truncated credential field: {0}")]
    TruncatedField(&'static str),

    /// Credential verification failed; the source tells why
    #[error("Authentication failed: {0}")]
    AuthFailed(#[source] StoreError),

    /// Transport error other than a short read
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl HandshakeError {
    /// Whether the client sent bytes that do not follow the wire format
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            HandshakeError::UnsupportedVersion(_)
                | HandshakeError::NoMethods
                | HandshakeError::TruncatedHeader
                | HandshakeError::TruncatedMethods { .. }
                | HandshakeError::TruncatedField(_)
        )
    }

    /// Whether the handshake was refused by server policy
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            HandshakeError::AuthRequired | HandshakeError::NoAcceptableMethod
        )
    }
}

/// Credential store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No credential matches the login and password pair
    #[error("Credential not found")]
    NotFound,

    /// A credential with this login already exists
    #[error("Credential already exists: {0}")]
    AlreadyExists(String),

    /// The login is empty or not valid UTF-8
    #[error("Invalid login")]
    InvalidLogin,

    /// The store did not answer within the deadline
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Backend failure without a more specific type
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Database driver error
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether this is a credential miss rather than an infrastructure failure
    pub fn is_credential_miss(&self) -> bool {
        matches!(self, StoreError::NotFound | StoreError::InvalidLogin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_error_display() {
        let err = HandshakeError::UnsupportedVersion(4);
        assert_eq!(format!("{}", err), "Unsupported SOCKS version: 4");

        let err = HandshakeError::TruncatedMethods { expected: 3 };
        assert_eq!(
            format!("{}", err),
            "Truncated method list: expected 3 bytes"
        );

        let err = HandshakeError::TruncatedField("username");
        assert_eq!(format!("{}", err), "Truncated credential field: username");

        let err = HandshakeError::AuthFailed(StoreError::NotFound);
        assert_eq!(
            format!("{}", err),
            "Authentication failed: Credential not found"
        );
    }

    #[test]
    fn test_handshake_error_classification() {
        assert!(HandshakeError::UnsupportedVersion(4).is_malformed());
        assert!(HandshakeError::NoMethods.is_malformed());
        assert!(HandshakeError::TruncatedHeader.is_malformed());
        assert!(HandshakeError::TruncatedMethods { expected: 1 }.is_malformed());
        assert!(HandshakeError::TruncatedField("password").is_malformed());
        assert!(!HandshakeError::AuthRequired.is_malformed());

        assert!(HandshakeError::AuthRequired.is_policy_violation());
        assert!(HandshakeError::NoAcceptableMethod.is_policy_violation());
        assert!(!HandshakeError::AuthFailed(StoreError::NotFound).is_policy_violation());
    }

    #[test]
    fn test_store_error_credential_miss() {
        assert!(StoreError::NotFound.is_credential_miss());
        assert!(StoreError::InvalidLogin.is_credential_miss());
        assert!(!StoreError::Timeout(Duration::from_secs(30)).is_credential_miss());
        assert!(!StoreError::Backend("down".to_string()).is_credential_miss());
    }

    #[test]
    fn test_socksguard_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::Other, "io error");
        let err: SocksguardError = io_err.into();
        assert!(matches!(err, SocksguardError::Io(_)));
    }

    #[test]
    fn test_socksguard_error_display() {
        let err = SocksguardError::Config("invalid config".to_string());
        assert_eq!(format!("{}", err), "Configuration error: invalid config");

        let err = SocksguardError::Store(StoreError::AlreadyExists("bob".to_string()));
        assert_eq!(
            format!("{}", err),
            "Store error: Credential already exists: bob"
        );
    }
}
