//! Error types for the review engine.
//!
//! Most failure modes in this engine are recovered locally (dead relays are
//! skipped, malformed events dropped, timeouts deliver partial results), so
//! these variants surface only the few genuinely fallible operations.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the review engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Relay client error (subscription bookkeeping, not transport; dead
    /// endpoints never produce this).
    #[error("relay client error: {0}")]
    Relay(#[from] nostr_sdk::client::Error),

    /// HTTP error talking to a mint's /v1/info endpoint.
    #[error("mint info request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
