use std::fmt;

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};

use crate::cipher::{CipherError, KEY_SIZE};

const BASE64_PREFIX: &str = "base64:";

/// Record encryption key as configured at startup.
///
/// Holds whatever bytes were configured; the length is enforced by the cipher on
/// every call and by [`EncryptionKey::validate`] at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey(Vec<u8>);

impl EncryptionKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Generate a random 256-bit key.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self(key.to_vec())
    }

    /// Derive a 256-bit key from a passphrase (SHA-256 of the UTF-8 bytes).
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self(Sha256::digest(passphrase.as_bytes()).to_vec())
    }

    /// Parse a configured key: `base64:<encoded>` or the raw 32-byte string itself.
    pub fn parse(value: &str) -> Result<Self> {
        let bytes = match value.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => BASE64
                .decode(encoded.trim())
                .map_err(|e| anyhow!("Invalid base64 encryption key: {}", e))?,
            None => value.as_bytes().to_vec(),
        };

        let key = Self(bytes);
        key.validate()?;
        Ok(key)
    }

    pub fn validate(&self) -> Result<(), CipherError> {
        if self.0.len() != KEY_SIZE {
            return Err(CipherError::InvalidKeyLength(self.0.len()));
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encode as a `base64:` config value.
    pub fn to_config_value(&self) -> String {
        format!("{}{}", BASE64_PREFIX, BASE64.encode(&self.0))
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey(<{} bytes redacted>)", self.0.len())
    }
}
