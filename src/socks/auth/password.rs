//! Username/password authentication handler
//!
//! Implements RFC 1929 username/password sub-negotiation for SOCKS5, verifying
//! the supplied pair against a [`CredentialStore`].

use crate::error::{HandshakeError, StoreError};
use crate::helper::read_full;
use crate::socks::consts::{SOCKS5_AUTH_FAILURE, SOCKS5_AUTH_SUCCESS, SOCKS5_AUTH_VERSION};
use crate::store::{Credential, CredentialStore};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

/// Username/password authentication handler
pub struct PasswordAuth<'a> {
    store: &'a dyn CredentialStore,
    lookup_timeout: Duration,
}

impl<'a> PasswordAuth<'a> {
    /// Create a handler verifying against `store`, bounding each lookup by
    /// `lookup_timeout`
    pub fn new(store: &'a dyn CredentialStore, lookup_timeout: Duration) -> Self {
        PasswordAuth {
            store,
            lookup_timeout,
        }
    }

    /// Perform username/password authentication and return the matched login
    ///
    /// # Protocol
    ///
    /// Client sends:
    /// ```text
    /// +----+------+----------+------+----------+
    /// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
    /// +----+------+----------+------+----------+
    /// | 1  |  1   | 0 to 255 |  1   | 0 to 255 |
    /// +----+------+----------+------+----------+
    /// ```
    ///
    /// Server responds:
    /// ```text
    /// +----+--------+
    /// |VER | STATUS |
    /// +----+--------+
    /// | 1  |   1    |
    /// +----+--------+
    /// ```
    ///
    /// A short read on any field aborts without a reply. Unknown logins,
    /// wrong passwords and store failures all answer with the same failure
    /// status; only the returned error tells them apart.
    pub async fn authenticate<S>(&self, stream: &mut S) -> Result<String, HandshakeError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Read version and username length
        let mut buf = [0u8; 2];
        read_field(stream, &mut buf, "username length").await?;

        let version = buf[0];
        let username_len = buf[1] as usize;

        if version != SOCKS5_AUTH_VERSION {
            debug!("Unexpected auth sub-negotiation version: {}", version);
        }

        // Read username
        let mut username = vec![0u8; username_len];
        read_field(stream, &mut username, "username").await?;

        // Read password length
        let mut buf = [0u8; 1];
        read_field(stream, &mut buf, "password length").await?;
        let password_len = buf[0] as usize;

        // Read password
        let mut password = vec![0u8; password_len];
        read_field(stream, &mut password, "password").await?;

        let outcome = self.verify(&username, &password).await;
        drop(password);

        match outcome {
            Ok(credential) => {
                send_auth_result(stream, SOCKS5_AUTH_SUCCESS).await?;
                debug!(login = ?credential.login(), "Authentication successful");
                Ok(credential.into_login())
            }
            Err(e) => {
                // Debug formatting escapes control bytes sent by the client
                let login = String::from_utf8_lossy(&username);
                if e.is_credential_miss() {
                    warn!(login = ?login, "Authentication rejected: {}", e);
                } else {
                    error!(
                        login = ?login,
                        backend = self.store.backend(),
                        "Credential store failure: {}",
                        e
                    );
                }

                if let Err(io_err) = send_auth_result(stream, SOCKS5_AUTH_FAILURE).await {
                    debug!("Failed to send authentication failure: {}", io_err);
                }
                Err(HandshakeError::AuthFailed(e))
            }
        }
    }

    /// Look the pair up, bounded by the lookup timeout
    async fn verify(&self, username: &[u8], password: &[u8]) -> Result<Credential, StoreError> {
        let login = std::str::from_utf8(username).map_err(|_| StoreError::InvalidLogin)?;

        match tokio::time::timeout(self.lookup_timeout, self.store.lookup(login, password)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.lookup_timeout)),
        }
    }
}

/// Read one length-delimited field, naming it in the truncation error
async fn read_field<S>(
    stream: &mut S,
    buf: &mut [u8],
    field: &'static str,
) -> Result<(), HandshakeError>
where
    S: AsyncRead + Unpin,
{
    if read_full(stream, buf).await? {
        Ok(())
    } else {
        Err(HandshakeError::TruncatedField(field))
    }
}

/// Send authentication result to client
async fn send_auth_result<S: AsyncWrite + Unpin>(stream: &mut S, status: u8) -> io::Result<()> {
    stream.write_all(&[SOCKS5_AUTH_VERSION, status]).await?;
    stream.flush().await?;
    Ok(())
}
