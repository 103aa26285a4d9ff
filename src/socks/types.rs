//! SOCKS5 handshake type definitions
//!
//! Defines the negotiated method and the result handed to the relay stage.

use super::consts::*;
use std::fmt;

/// Authentication method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication required
    NoAuth,
    /// Username/password authentication
    UsernamePassword,
}

impl AuthMethod {
    /// Convert to SOCKS5 method byte
    pub fn to_byte(self) -> u8 {
        match self {
            AuthMethod::NoAuth => SOCKS5_AUTH_METHOD_NONE,
            AuthMethod::UsernamePassword => SOCKS5_AUTH_METHOD_PASSWORD,
        }
    }

    /// Parse from SOCKS5 method byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_AUTH_METHOD_NONE => Some(AuthMethod::NoAuth),
            SOCKS5_AUTH_METHOD_PASSWORD => Some(AuthMethod::UsernamePassword),
            _ => None,
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::NoAuth => write!(f, "NO AUTH"),
            AuthMethod::UsernamePassword => write!(f, "USERNAME/PASSWORD"),
        }
    }
}

/// Who the client turned out to be.
///
/// An anonymous client never carries a login, an authenticated one always does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Negotiated [`AuthMethod::NoAuth`]
    Anonymous,
    /// Negotiated [`AuthMethod::UsernamePassword`] with this matched login
    User(String),
}

impl Identity {
    /// The method that produced this identity
    pub fn method(&self) -> AuthMethod {
        match self {
            Identity::Anonymous => AuthMethod::NoAuth,
            Identity::User(_) => AuthMethod::UsernamePassword,
        }
    }

    /// The matched login, if any
    pub fn login(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::User(login) => Some(login),
        }
    }
}

/// A connection that completed the handshake
#[derive(Debug)]
pub struct AuthenticatedClient<S> {
    identity: Identity,
    stream: S,
}

impl<S> AuthenticatedClient<S> {
    /// Pair a negotiated identity with its transport
    pub fn new(identity: Identity, stream: S) -> Self {
        AuthenticatedClient { identity, stream }
    }

    /// Selected authentication method
    pub fn method(&self) -> AuthMethod {
        self.identity.method()
    }

    /// Matched login; `None` for anonymous clients
    pub fn login(&self) -> Option<&str> {
        self.identity.login()
    }

    /// Negotiated identity
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Borrow the underlying transport
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Split into identity and transport
    pub fn into_parts(self) -> (Identity, S) {
        (self.identity, self.stream)
    }
}
