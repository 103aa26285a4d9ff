//! # Socksguard - SOCKS5 Authentication Front-End
//!
//! Socksguard accepts TCP connections, negotiates the SOCKS5 authentication
//! method and, when credentials are required, runs the RFC 1929
//! username/password sub-negotiation against a salted credential store.
//!
//! ## Features
//!
//! - **Method Negotiation**: Selects no-auth or username/password depending on
//!   whether a credential store is configured
//! - **Salted Credentials**: Passwords are verified as SHA-256 of the password
//!   followed by a store-wide salt
//! - **Pluggable Stores**: SQLite-backed store, or an in-memory one for tests
//! - **Hand-off**: Authenticated connections are passed to a [`server::Handoff`]
//!   for the command/relay stage
//!
//! ## Usage
//!
//! ```rust,ignore
//! use socksguard::config::load_config;
//! use socksguard::server::Server;
//! use socksguard::socks::Negotiator;
//! use socksguard::store::open_store;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let store = open_store(&config.store).await?;
//!     let negotiator = Negotiator::from_config(&config.server, Some(store));
//!
//!     Server::bind(&config.server.listen_addr, negotiator)
//!         .await?
//!         .listen()
//!         .await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SOCKS5 Client -> Server (accept) -> Negotiator -> PasswordAuth -> CredentialStore
//!                                         |
//!                                         +-> Handoff (command/relay stage)
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod helper;
pub mod server;
pub mod socks;
pub mod store;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{HandshakeError, SocksguardError, StoreError};
pub use server::Server;

/// Version of the Socksguard library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
