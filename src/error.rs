//! Error types for wm-offerwall.
//!
//! Payment verification and event classification never surface errors to
//! callers; they collapse to `false`. The variants here cover the ambient
//! surfaces: configuration, the HTTP client and the preview tool server.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by wm-offerwall.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be parsed or serialized.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem or socket I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Preview tool listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: std::net::SocketAddr,
        /// Underlying socket error.
        source: std::io::Error,
    },
}
