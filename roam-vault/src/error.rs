//! Error types for the configuration store

use std::io;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum Error {
    /// No configuration stored under the requested name
    #[error("configuration not found: {0}")]
    NotFound(String),

    /// The underlying persistent file could not be read or written
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),

    /// The on-disk envelope is not valid JSON/base64
    #[error("storage envelope error: {0}")]
    Envelope(String),

    /// Sealing or opening a value failed
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Master key acquisition failed
    #[error("key provider error: {0}")]
    KeyProvider(String),

    /// Stored text could not be re-parsed into a record
    #[error(transparent)]
    Parse(#[from] roam_conf::Error),
}

impl Error {
    /// Check if the error is a missing-record error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
