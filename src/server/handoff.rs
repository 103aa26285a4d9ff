//! Hand-off of authenticated connections
//!
//! The acceptor's responsibility ends once a client is authenticated. What
//! happens next (command parsing, relaying) belongs to a [`Handoff`]
//! implementation.

use super::StreamDyn;
use crate::socks::AuthenticatedClient;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::net::SocketAddr;
use tracing::info;

/// Receives every connection that completed the handshake.
///
/// The connection is closed when the client value is dropped, so an
/// implementation that returns without storing it ends the connection.
///
/// # Example
///
/// ```rust,ignore
/// use socksguard::server::{Handoff, StreamDyn};
/// use socksguard::socks::AuthenticatedClient;
///
/// #[derive(Debug)]
/// struct Relay;
///
/// #[async_trait::async_trait]
/// impl Handoff for Relay {
///     async fn handoff(
///         &self,
///         client: AuthenticatedClient<Box<dyn StreamDyn>>,
///         peer: std::net::SocketAddr,
///     ) -> anyhow::Result<()> {
///         // Parse the SOCKS5 request and relay traffic
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handoff: Send + Sync + Debug {
    /// Take over an authenticated connection
    async fn handoff(
        &self,
        client: AuthenticatedClient<Box<dyn StreamDyn>>,
        peer: SocketAddr,
    ) -> Result<()>;
}

/// Default hand-off: records the authenticated client and closes it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandoff;

#[async_trait]
impl Handoff for LogHandoff {
    async fn handoff(
        &self,
        client: AuthenticatedClient<Box<dyn StreamDyn>>,
        peer: SocketAddr,
    ) -> Result<()> {
        info!(
            peer = %peer,
            method = %client.method(),
            login = ?client.login(),
            "Client handed off"
        );
        Ok(())
    }
}
