//! Error types for tunnel control

use thiserror::Error;

/// Result type alias for tunnel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while controlling the tunnel interface
#[derive(Debug, Error)]
pub enum Error {
    /// Platform tunneling permission has not been granted
    #[error("tunneling permission not granted: {0}")]
    PermissionDenied(String),

    /// The platform refused to create the interface
    #[error("failed to establish tunnel interface: {0}")]
    Establish(String),

    /// Tunnel parameters were rejected
    #[error("invalid tunnel parameters: {0}")]
    Params(String),

    /// A start was requested while the tunnel is already running
    #[error("tunnel is already running")]
    AlreadyRunning,
}

impl Error {
    /// Check if the error is a permission failure
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::PermissionDenied(_))
    }
}
