//! Encrypted configuration store for Roam VPN
//!
//! This crate persists named tunnel configurations with confidentiality
//! at rest. The store is a single key-value namespace backed by one JSON
//! file: `config_<name>` keys hold configuration text and the
//! `active_config` key holds the name of the configuration currently
//! designated for connection attempts. Every value is sealed with
//! AES-256-CBC under a master key obtained from a [`MasterKeyProvider`];
//! key custody (platform key stores, hardware keyrings) lives behind
//! that trait and outside this crate.
//!
//! The store is built for a single process handle passed explicitly to
//! whoever needs it. It serializes its own access internally but is not
//! designed for concurrent multi-writer use across processes.
//!
//! # Example
//!
//! ```ignore
//! use roam_vault::{ConfigVault, FileKeyProvider};
//!
//! let keys = FileKeyProvider::new("/var/lib/roam/vault.key");
//! let vault = ConfigVault::open("/var/lib/roam/vault.json", &keys)?;
//!
//! let record = roam_conf::parse("work", text)?;
//! vault.save(&record)?;
//! vault.set_active(Some("work"))?;
//! ```

pub mod cipher;
pub mod error;
pub mod keyring;
pub mod store;

pub use cipher::ValueCipher;
pub use error::{Error, Result};
pub use keyring::{FileKeyProvider, MasterKeyProvider, StaticKeyProvider};
pub use store::ConfigVault;

/// Key prefix for stored configuration records
pub const CONFIG_KEY_PREFIX: &str = "config_";

/// Key holding the active configuration name
pub const ACTIVE_CONFIG_KEY: &str = "active_config";
