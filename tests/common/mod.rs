//! Test utilities and mocks for Socksguard
//!
//! This module provides common test utilities used across integration tests.

use socksguard::config::{Config, StoreBackend};
use socksguard::server::{Handoff, Server};
use socksguard::socks::Negotiator;
use socksguard::store::{CredentialStore, MemoryStore, PasswordHasher};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{duplex, AsyncRead, AsyncReadExt, DuplexStream};
use tokio::net::TcpListener;

/// Salt shared by the test stores
pub const TEST_SALT: &str = "storageSalt";

/// Create a pair of connected duplex streams for testing
pub fn create_mock_stream_pair() -> (DuplexStream, DuplexStream) {
    duplex(8192)
}

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Create an in-memory store holding the given credentials
pub async fn create_memory_store(users: &[(&str, &str)]) -> Arc<dyn CredentialStore> {
    let store = MemoryStore::new(PasswordHasher::new(TEST_SALT));
    for (login, password) in users {
        store.create(login, password.as_bytes()).await.unwrap();
    }
    Arc::new(store)
}

/// Bind a server on an ephemeral port and run it in the background
pub async fn spawn_server(negotiator: Negotiator) -> SocketAddr {
    spawn_server_with(negotiator, None).await
}

/// Like [`spawn_server`], optionally replacing the hand-off stage
pub async fn spawn_server_with(
    negotiator: Negotiator,
    handoff: Option<Arc<dyn Handoff>>,
) -> SocketAddr {
    let mut server = Server::bind("127.0.0.1:0", negotiator).await.unwrap();
    if let Some(handoff) = handoff {
        server = server.with_handoff(handoff);
    }
    let addr = server.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.listen().await;
    });

    addr
}

/// Read everything until the peer closes, treating a reset as a close
pub async fn read_until_closed<S: AsyncRead + Unpin>(stream: &mut S) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => return received,
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => return received,
            Err(e) => panic!("unexpected read error: {}", e),
        }
    }
}

/// Test configuration builder
pub struct TestConfigBuilder {
    auth_required: bool,
    backend: StoreBackend,
    path: PathBuf,
    salt: String,
    lookup_timeout: u64,
    reply_on_rejection: bool,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            auth_required: false,
            backend: StoreBackend::Memory,
            path: PathBuf::from("storage"),
            salt: TEST_SALT.to_string(),
            lookup_timeout: 5,
            reply_on_rejection: false,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set authentication required
    pub fn auth_required(mut self, required: bool) -> Self {
        self.auth_required = required;
        self
    }

    /// Use the SQLite backend rooted at `path`
    pub fn sqlite(mut self, path: impl Into<PathBuf>) -> Self {
        self.backend = StoreBackend::Sqlite;
        self.path = path.into();
        self
    }

    /// Set the store salt
    pub fn salt(mut self, salt: &str) -> Self {
        self.salt = salt.to_string();
        self
    }

    /// Reply `[0x05, 0xFF]` on rejection
    pub fn reply_on_rejection(mut self, enabled: bool) -> Self {
        self.reply_on_rejection = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        let mut config = Config::default();
        config.server.listen_addr = "127.0.0.1:0".to_string();
        config.server.auth_required = self.auth_required;
        config.server.lookup_timeout = self.lookup_timeout;
        config.server.reply_on_rejection = self.reply_on_rejection;
        config.store.backend = self.backend;
        config.store.path = self.path;
        config.store.salt = self.salt;
        config
    }
}

/// Mock SOCKS5 handshake data
pub mod socks5_mock {
    use socksguard::socks::*;

    /// Create a method selection request advertising `methods`
    pub fn create_method_request(methods: &[u8]) -> Vec<u8> {
        let mut request = vec![SOCKS5_VERSION, methods.len() as u8];
        request.extend_from_slice(methods);
        request
    }

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        create_method_request(&[SOCKS5_AUTH_METHOD_NONE])
    }

    /// Create a password auth method selection request
    pub fn create_auth_request_password() -> Vec<u8> {
        create_method_request(&[SOCKS5_AUTH_METHOD_PASSWORD])
    }

    /// Create a username/password sub-negotiation request
    pub fn create_password_request(username: &str, password: &str) -> Vec<u8> {
        let mut request = vec![SOCKS5_AUTH_VERSION, username.len() as u8];
        request.extend_from_slice(username.as_bytes());
        request.push(password.len() as u8);
        request.extend_from_slice(password.as_bytes());
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_mock_stream_pair() {
        let (mut a, mut b) = create_mock_stream_pair();

        use tokio::io::AsyncWriteExt;

        a.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        b.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[tokio::test]
    async fn test_create_test_listener() {
        let (listener, addr) = create_test_listener().await;
        assert!(addr.port() > 0);
        drop(listener);
    }

    #[test]
    fn test_config_builder() {
        let config = TestConfigBuilder::new()
            .auth_required(true)
            .salt("pepper")
            .reply_on_rejection(true)
            .build();

        assert!(config.server.auth_required);
        assert!(config.server.reply_on_rejection);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.salt, "pepper");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socks5_mock_password_request() {
        let request = socks5_mock::create_password_request("bob", "pw1");
        assert_eq!(
            request,
            vec![0x01, 0x03, b'b', b'o', b'b', 0x03, b'p', b'w', b'1']
        );
    }

    #[test]
    fn test_socks5_mock_method_request() {
        let request = socks5_mock::create_method_request(&[0x00, 0x02]);
        assert_eq!(request, vec![0x05, 0x02, 0x00, 0x02]);
    }
}
