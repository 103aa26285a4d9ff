//! SOCKS5 authentication module
//!
//! Handles method negotiation and, when selected, username/password
//! sub-negotiation.

mod password;

pub use password::PasswordAuth;

use super::consts::*;
use super::types::{AuthMethod, AuthenticatedClient, Identity};
use crate::config::ServerConfig;
use crate::error::HandshakeError;
use crate::helper::{duration_from_secs, read_full, DEFAULT_LOOKUP_TIMEOUT_SECS};
use crate::store::CredentialStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Drives the SOCKS5 handshake for one connection at a time.
///
/// The credential store doubles as the authentication policy: with a store
/// only username/password is offered, without one only no-auth is.
#[derive(Debug, Clone)]
pub struct Negotiator {
    store: Option<Arc<dyn CredentialStore>>,
    lookup_timeout: Duration,
    reply_on_rejection: bool,
}

impl Negotiator {
    /// Create a negotiator; `store` enables and requires authentication
    pub fn new(store: Option<Arc<dyn CredentialStore>>) -> Self {
        Negotiator {
            store,
            lookup_timeout: duration_from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            reply_on_rejection: false,
        }
    }

    /// Create a negotiator from the server configuration
    pub fn from_config(config: &ServerConfig, store: Option<Arc<dyn CredentialStore>>) -> Self {
        Negotiator::new(store)
            .with_lookup_timeout(config.lookup_timeout())
            .with_rejection_reply(config.reply_on_rejection)
    }

    /// Set the credential lookup timeout
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Send `[0x05, 0xFF]` before aborting when no method is acceptable
    pub fn with_rejection_reply(mut self, enabled: bool) -> Self {
        self.reply_on_rejection = enabled;
        self
    }

    /// Whether clients must authenticate with username/password
    pub fn requires_auth(&self) -> bool {
        self.store.is_some()
    }

    /// Credential lookup timeout
    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Select the method to use given the client's advertised method bytes
    pub fn select_method(&self, methods: &[u8]) -> Result<AuthMethod, HandshakeError> {
        let offers_password = methods.contains(&SOCKS5_AUTH_METHOD_PASSWORD);
        let offers_none = methods.contains(&SOCKS5_AUTH_METHOD_NONE);

        if self.requires_auth() {
            // Must use password authentication, even if no-auth is offered too
            if offers_password {
                Ok(AuthMethod::UsernamePassword)
            } else {
                Err(HandshakeError::AuthRequired)
            }
        } else if offers_none {
            Ok(AuthMethod::NoAuth)
        } else {
            Err(HandshakeError::NoAcceptableMethod)
        }
    }

    /// Run the handshake on `stream` and return the client's identity
    ///
    /// # Protocol
    ///
    /// Client sends:
    /// ```text
    /// +----+----------+----------+
    /// |VER | NMETHODS | METHODS  |
    /// +----+----------+----------+
    /// | 1  |    1     | 1 to 255 |
    /// +----+----------+----------+
    /// ```
    ///
    /// Server responds with `[VER, METHOD]`, then runs the username/password
    /// sub-negotiation if that method was selected.
    pub async fn negotiate<S>(&self, stream: &mut S) -> Result<Identity, HandshakeError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Step 1: Read version and number of methods
        let mut header = [0u8; 2];
        if !read_full(stream, &mut header).await? {
            return Err(HandshakeError::TruncatedHeader);
        }

        let version = header[0];
        let num_methods = header[1] as usize;

        if version != SOCKS5_VERSION {
            return Err(HandshakeError::UnsupportedVersion(version));
        }

        if num_methods == 0 {
            return Err(HandshakeError::NoMethods);
        }

        // Step 2: Read available methods
        let mut methods = vec![0u8; num_methods];
        if !read_full(stream, &mut methods).await? {
            return Err(HandshakeError::TruncatedMethods {
                expected: num_methods,
            });
        }

        // Step 3: Select authentication method
        let method = match self.select_method(&methods) {
            Ok(method) => method,
            Err(e) => {
                if self.reply_on_rejection {
                    if let Err(io_err) =
                        send_selected_method(stream, SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE).await
                    {
                        debug!("Failed to send method rejection: {}", io_err);
                    }
                }
                return Err(e);
            }
        };

        // Step 4: Send selected method
        send_selected_method(stream, method.to_byte()).await?;
        debug!("Selected authentication method: {}", method);

        // Step 5: Perform authentication if required
        match (method, &self.store) {
            (AuthMethod::UsernamePassword, Some(store)) => {
                let login = PasswordAuth::new(store.as_ref(), self.lookup_timeout)
                    .authenticate(stream)
                    .await?;
                Ok(Identity::User(login))
            }
            (AuthMethod::UsernamePassword, None) => Err(HandshakeError::NoAcceptableMethod),
            (AuthMethod::NoAuth, _) => Ok(Identity::Anonymous),
        }
    }

    /// Run the handshake and take ownership of the stream on success.
    ///
    /// On failure the stream is dropped here, closing the connection.
    pub async fn authenticate<S>(
        &self,
        mut stream: S,
    ) -> Result<AuthenticatedClient<S>, HandshakeError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let identity = self.negotiate(&mut stream).await?;
        Ok(AuthenticatedClient::new(identity, stream))
    }
}

/// Send `[VER, METHOD]` to the client
async fn send_selected_method<S: AsyncWrite + Unpin>(
    stream: &mut S,
    method: u8,
) -> std::io::Result<()> {
    stream.write_all(&[SOCKS5_VERSION, method]).await?;
    stream.flush().await
}
