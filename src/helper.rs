//! Helper utilities for Socksguard
//!
//! This module provides defaults and small utility functions used throughout
//! the application.

use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default listening address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:1080";

/// Default credential lookup timeout in seconds
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Default directory holding the SQLite credential database
pub const DEFAULT_STORE_PATH: &str = "storage";

/// Parse duration from seconds
pub fn duration_from_secs(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

/// Fill `buf` from `stream`, telling a short read apart from other IO errors.
///
/// Returns `Ok(false)` when the stream ended before `buf` was full.
pub async fn read_full<S>(stream: &mut S, buf: &mut [u8]) -> io::Result<bool>
where
    S: AsyncRead + Unpin + ?Sized,
{
    match stream.read_exact(buf).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
