//! Error types for configuration parsing

use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling configuration text
///
/// The current parser accepts any input, so these variants are reserved
/// for callers that layer stricter checks on top and for keeping parse
/// failure representable in every signature that re-parses stored text.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration text was rejected
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A required field was missing
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
