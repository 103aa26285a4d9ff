//! Connection acceptor for Socksguard
//!
//! Owns the listening socket and runs one task per accepted connection. Each
//! task drives the SOCKS5 handshake and passes authenticated clients to a
//! [`Handoff`]. Concurrency is unbounded and sockets have no read timeout.

mod handoff;

pub use handoff::{Handoff, LogHandoff};

use crate::error::HandshakeError;
use crate::socks::Negotiator;
use anyhow::{Context, Result};
use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// A dynamic stream trait for accepted connections.
///
/// Lets the handshake and the hand-off work on any transport (TCP in
/// production, in-memory pipes in tests) without being generic over it.
pub trait StreamDyn: AsyncRead + AsyncWrite + Unpin + Send + Debug {}

/// Blanket implementation: any type implementing the required traits is a StreamDyn.
impl<T: AsyncRead + AsyncWrite + Unpin + Send + Debug> StreamDyn for T {}

/// Per-connection handling shared by all connection tasks
#[derive(Debug, Clone)]
pub struct Acceptor {
    negotiator: Arc<Negotiator>,
    handoff: Arc<dyn Handoff>,
}

impl Acceptor {
    /// Create an acceptor with the default [`LogHandoff`]
    pub fn new(negotiator: Negotiator) -> Self {
        Acceptor {
            negotiator: Arc::new(negotiator),
            handoff: Arc::new(LogHandoff),
        }
    }

    /// Replace the hand-off stage
    pub fn with_handoff(mut self, handoff: Arc<dyn Handoff>) -> Self {
        self.handoff = handoff;
        self
    }

    /// Drive one connection through the handshake, then close it.
    ///
    /// The stream is owned here and dropped on every path, so the connection
    /// is closed exactly once whether the handshake succeeds or fails.
    pub async fn handle_connection<S>(&self, stream: S, peer: SocketAddr)
    where
        S: StreamDyn + 'static,
    {
        debug!(peer = %peer, "Accepted connection");

        let stream: Box<dyn StreamDyn> = Box::new(stream);
        match self.negotiator.authenticate(stream).await {
            Ok(client) => {
                match client.login() {
                    Some(login) => info!(peer = %peer, login = ?login, "Authenticated handshake"),
                    None => info!(peer = %peer, "Anonymous handshake"),
                }

                if let Err(e) = self.handoff.handoff(client, peer).await {
                    warn!(peer = %peer, "Hand-off failed: {:#}", e);
                }
            }
            Err(e) if e.is_malformed() => {
                warn!(peer = %peer, "Malformed handshake: {}", e);
            }
            Err(e) if e.is_policy_violation() => {
                warn!(peer = %peer, "Handshake refused: {}", e);
            }
            Err(HandshakeError::Io(e)) => {
                warn!(peer = %peer, "Connection error during handshake: {}", e);
            }
            Err(e) => {
                // Credential failures are logged by the sub-negotiation
                debug!(peer = %peer, "Handshake failed: {}", e);
            }
        }

        debug!(peer = %peer, "Connection closed");
    }
}

/// SOCKS5 listener
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    acceptor: Acceptor,
}

impl Server {
    /// Bind the listening address
    pub async fn bind(addr: &str, negotiator: Negotiator) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Cannot listen on address '{}'", addr))?;

        Ok(Server {
            listener,
            acceptor: Acceptor::new(negotiator),
        })
    }

    /// Replace the hand-off stage
    pub fn with_handoff(mut self, handoff: Arc<dyn Handoff>) -> Self {
        self.acceptor = self.acceptor.with_handoff(handoff);
        self
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Accept connections forever.
    ///
    /// Accept errors are logged and the loop continues. Each connection runs
    /// on its own task, so a stalled client never blocks the loop.
    pub async fn listen(&self) -> Result<()> {
        info!(
            "Listening on {} (authentication {})",
            self.local_addr()?,
            if self.acceptor.negotiator.requires_auth() {
                "required"
            } else {
                "disabled"
            }
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let acceptor = self.acceptor.clone();
                    tokio::spawn(async move {
                        acceptor.handle_connection(stream, peer).await;
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
