//! SOCKS5 handshake module for Socksguard
//!
//! This module implements SOCKS5 method negotiation and username/password
//! authentication. Its contract ends once the client is authenticated: the
//! resulting [`AuthenticatedClient`] is handed to the relay stage.

mod auth;
mod consts;
mod types;

pub use auth::{Negotiator, PasswordAuth};
pub use consts::*;
pub use types::{AuthMethod, AuthenticatedClient, Identity};
