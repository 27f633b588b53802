//! Value encryption for the store
//!
//! Values are sealed with AES-256-CBC and PKCS#7 padding under a fresh
//! random IV per value. The sealed form is `IV || ciphertext`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::Rng;

use crate::error::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size / IV size
const CIPHER_BLOCK_SIZE: usize = 16;

/// Cipher sealing and opening individual store values
#[derive(Clone)]
pub struct ValueCipher {
    key: [u8; 32],
}

impl ValueCipher {
    /// Create a cipher from a 32-byte master key
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Seal a plaintext value, returning `IV || ciphertext`
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let iv: [u8; CIPHER_BLOCK_SIZE] = rand::thread_rng().gen();

        let cipher = Aes256CbcEnc::new(&self.key.into(), &iv.into());
        let padded_len = ((plaintext.len() / CIPHER_BLOCK_SIZE) + 1) * CIPHER_BLOCK_SIZE;
        let mut buffer = vec![0u8; padded_len];
        buffer[..plaintext.len()].copy_from_slice(plaintext);

        let ciphertext = cipher
            .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
            .map_err(|e| Error::Crypto(e.to_string()))?;

        let mut sealed = Vec::with_capacity(CIPHER_BLOCK_SIZE + ciphertext.len());
        sealed.extend_from_slice(&iv);
        sealed.extend_from_slice(ciphertext);

        Ok(sealed)
    }

    /// Open a sealed value produced by [`ValueCipher::seal`]
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < CIPHER_BLOCK_SIZE {
            return Err(Error::Crypto(format!(
                "sealed value too short: {} bytes",
                sealed.len()
            )));
        }

        let iv: [u8; CIPHER_BLOCK_SIZE] = sealed[..CIPHER_BLOCK_SIZE]
            .try_into()
            .map_err(|_| Error::Crypto("invalid IV".to_string()))?;

        let cipher = Aes256CbcDec::new(&self.key.into(), &iv.into());
        let mut buffer = sealed[CIPHER_BLOCK_SIZE..].to_vec();

        let plaintext = cipher
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|e| Error::Crypto(e.to_string()))?;

        Ok(plaintext.to_vec())
    }
}

impl std::fmt::Debug for ValueCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("ValueCipher").finish_non_exhaustive()
    }
}
