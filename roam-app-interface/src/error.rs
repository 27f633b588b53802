//! Error types for the application interface

use thiserror::Error;

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur behind the application interface
///
/// These stay typed inside the engine; observers only ever see the
/// rendered message carried in
/// [`ConnectionState::error`](crate::ConnectionState).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration text error
    #[error(transparent)]
    Conf(#[from] roam_conf::Error),

    /// Store error
    #[error(transparent)]
    Vault(#[from] roam_vault::Error),

    /// Tunnel controller error
    #[error(transparent)]
    Tunnel(#[from] roam_tunnel::Error),

    /// Settings were rejected
    #[error("settings error: {0}")]
    Settings(String),

    /// Failed to parse the settings file
    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task failed to complete
    #[error("background task failed: {0}")]
    Task(String),
}
