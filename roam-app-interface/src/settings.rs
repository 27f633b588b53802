//! Application settings
//!
//! Host-level settings for a Roam front-end, kept in a TOML file. This
//! is distinct from tunnel configuration records: those are WireGuard
//! text blobs living inside the vault, while the settings decide where
//! the vault lives and how the process behaves.
//!
//! # Example Settings
//!
//! ```toml
//! [storage]
//! dir = "/var/lib/roam"
//!
//! [tunnel]
//! permission_granted = true
//!
//! [log]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Recognized log levels for [`LogSettings::level`]
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Top-level settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Where vault data lives
    #[serde(default)]
    pub storage: StorageSettings,

    /// Tunnel settings
    #[serde(default)]
    pub tunnel: TunnelSettings,

    /// Logging settings
    #[serde(default)]
    pub log: LogSettings,
}

/// Storage location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the vault file and its key file
    pub dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("roam-data"),
        }
    }
}

/// Tunnel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelSettings {
    /// Whether the host granted tunneling permission
    ///
    /// Granting is an interactive platform flow outside this process;
    /// the flag records its outcome.
    #[serde(default = "default_permission")]
    pub permission_granted: bool,
}

impl Default for TunnelSettings {
    fn default() -> Self {
        Self {
            permission_granted: default_permission(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_permission() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppSettings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: AppSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.storage.dir.as_os_str().is_empty() {
            return Err(Error::Settings("storage.dir must not be empty".into()));
        }

        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            return Err(Error::Settings(format!(
                "unknown log level '{}' (expected one of {})",
                self.log.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Path of the vault file under the storage directory
    pub fn vault_file(&self) -> PathBuf {
        self.storage.dir.join("vault.json")
    }

    /// Path of the vault key file under the storage directory
    pub fn key_file(&self) -> PathBuf {
        self.storage.dir.join("vault.key")
    }

    /// A commented sample settings file
    pub fn sample() -> &'static str {
        r#"# Roam VPN settings

[storage]
# Directory holding the encrypted vault and its key file.
dir = "roam-data"

[tunnel]
# Whether the host granted tunneling permission.
permission_granted = true

[log]
# Log level: error, warn, info, debug, trace.
level = "info"
"#
    }
}
