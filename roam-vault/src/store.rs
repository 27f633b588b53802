//! The configuration vault
//!
//! A single JSON file maps namespace keys to sealed values:
//!
//! ```json
//! {
//!   "active_config": "base64(iv || ciphertext)",
//!   "config_home": "base64(iv || ciphertext)",
//!   "config_work": "base64(iv || ciphertext)"
//! }
//! ```
//!
//! Writes go through a temp file and rename so a crash never leaves a
//! half-written vault behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::warn;

use roam_conf::TunnelConfig;

use crate::cipher::ValueCipher;
use crate::error::{Error, Result};
use crate::keyring::MasterKeyProvider;
use crate::{ACTIVE_CONFIG_KEY, CONFIG_KEY_PREFIX};

/// Encrypted named-configuration store
///
/// See the crate docs for the on-disk layout. All operations take `&self`;
/// access is serialized internally.
pub struct ConfigVault {
    path: PathBuf,
    cipher: ValueCipher,
    entries: Mutex<BTreeMap<String, String>>,
}

impl ConfigVault {
    /// Open the vault at `path`, creating an empty one if absent
    pub fn open<P: AsRef<Path>>(path: P, keys: &dyn MasterKeyProvider) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cipher = ValueCipher::new(keys.master_key()?);

        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| Error::Envelope(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(Error::Storage(e)),
        };

        Ok(Self {
            path,
            cipher,
            entries: Mutex::new(entries),
        })
    }

    /// Upsert a configuration record under its name
    ///
    /// A record saved under an existing name replaces it entirely. Only
    /// the raw text is persisted; derived fields are re-computed on read.
    pub fn save(&self, record: &TunnelConfig) -> Result<()> {
        let sealed = self.seal_value(&record.raw)?;
        let mut entries = self.entries.lock().expect("vault lock poisoned");
        entries.insert(config_key(&record.name), sealed);
        self.persist(&entries)
    }

    /// Load the configuration stored under `name`
    ///
    /// Fails with [`Error::NotFound`] when absent; otherwise the stored
    /// text is re-parsed into a fresh record, and a parse failure
    /// propagates to the caller.
    pub fn load(&self, name: &str) -> Result<TunnelConfig> {
        let sealed = {
            let entries = self.entries.lock().expect("vault lock poisoned");
            entries
                .get(&config_key(name))
                .cloned()
                .ok_or_else(|| Error::NotFound(name.to_string()))?
        };

        let raw = self.open_value(&sealed)?;
        Ok(roam_conf::parse(name, &raw)?)
    }

    /// List every stored configuration record
    ///
    /// Each record is opened and parsed independently. An entry that can
    /// no longer be opened or parsed is skipped with a warning rather
    /// than failing the whole listing.
    pub fn list(&self) -> Result<Vec<TunnelConfig>> {
        let entries = self.entries.lock().expect("vault lock poisoned");
        let mut records = Vec::new();

        for (key, sealed) in entries.iter() {
            let Some(name) = key.strip_prefix(CONFIG_KEY_PREFIX) else {
                continue;
            };

            let raw = match self.open_value(sealed) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(name, error = %e, "skipping unreadable configuration");
                    continue;
                }
            };
            match roam_conf::parse(name, &raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(name, error = %e, "skipping unparsable configuration");
                }
            }
        }

        Ok(records)
    }

    /// Remove the configuration stored under `name`
    ///
    /// Deleting a name that is not stored is a no-op, not an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("vault lock poisoned");
        if entries.remove(&config_key(name)).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    /// Set or clear the active configuration pointer
    pub fn set_active(&self, name: Option<&str>) -> Result<()> {
        let mut entries = self.entries.lock().expect("vault lock poisoned");
        match name {
            Some(name) => {
                let sealed = self.seal_value(name)?;
                entries.insert(ACTIVE_CONFIG_KEY.to_string(), sealed);
            }
            None => {
                if entries.remove(ACTIVE_CONFIG_KEY).is_none() {
                    return Ok(());
                }
            }
        }
        self.persist(&entries)
    }

    /// Read the active configuration pointer, if set
    pub fn active(&self) -> Result<Option<String>> {
        let sealed = {
            let entries = self.entries.lock().expect("vault lock poisoned");
            entries.get(ACTIVE_CONFIG_KEY).cloned()
        };
        match sealed {
            Some(sealed) => Ok(Some(self.open_value(&sealed)?)),
            None => Ok(None),
        }
    }

    fn seal_value(&self, value: &str) -> Result<String> {
        let sealed = self.cipher.seal(value.as_bytes())?;
        Ok(BASE64.encode(sealed))
    }

    fn open_value(&self, sealed: &str) -> Result<String> {
        let bytes = BASE64
            .decode(sealed)
            .map_err(|e| Error::Envelope(e.to_string()))?;
        let plaintext = self.cipher.open(&bytes)?;
        String::from_utf8(plaintext).map_err(|e| Error::Envelope(e.to_string()))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::Envelope(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl std::fmt::Debug for ConfigVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigVault")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn config_key(name: &str) -> String {
    format!("{}{}", CONFIG_KEY_PREFIX, name)
}
