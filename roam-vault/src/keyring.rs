//! Master key acquisition
//!
//! The store never generates or holds key custody policy itself; it asks
//! a [`MasterKeyProvider`] for the 32-byte master key. Platform key
//! stores plug in behind this trait. [`FileKeyProvider`] is the built-in
//! provider for hosts without one; [`StaticKeyProvider`] serves tests.

use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::error::{Error, Result};

/// Source of the 32-byte master key used to seal store values
pub trait MasterKeyProvider: Send + Sync {
    /// Return the master key, creating it if the provider supports that
    fn master_key(&self) -> Result<[u8; 32]>;
}

/// Key provider backed by a raw key file
///
/// Creates a random key with owner-only permissions on first use and
/// reloads it afterwards.
#[derive(Debug, Clone)]
pub struct FileKeyProvider {
    path: PathBuf,
}

impl FileKeyProvider {
    /// Create a provider for the given key file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn generate(&self) -> Result<[u8; 32]> {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, key)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(key)
    }
}

impl MasterKeyProvider for FileKeyProvider {
    fn master_key(&self) -> Result<[u8; 32]> {
        match fs::read(&self.path) {
            Ok(bytes) => bytes.as_slice().try_into().map_err(|_| {
                Error::KeyProvider(format!(
                    "key file {} holds {} bytes, expected 32",
                    self.path.display(),
                    bytes.len()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.generate(),
            Err(e) => Err(Error::Storage(e)),
        }
    }
}

/// Fixed in-memory key, for tests
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: [u8; 32],
}

impl StaticKeyProvider {
    /// Create a provider returning the given key
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }
}

impl MasterKeyProvider for StaticKeyProvider {
    fn master_key(&self) -> Result<[u8; 32]> {
        Ok(self.key)
    }
}
