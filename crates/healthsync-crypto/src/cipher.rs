use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use thiserror::Error;

/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;
/// GCM nonce length in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;
/// GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("encryption key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("ciphertext is shorter than the 12-byte nonce")]
    TruncatedInput,

    /// Tag mismatch. Corruption and a wrong key are deliberately indistinguishable.
    #[error("ciphertext failed authentication")]
    AuthenticationFailed,

    #[error("plaintext too large to encrypt")]
    PayloadTooLarge,
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_SIZE {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)))
}

/// Encrypt a plaintext with AES-256-GCM under a fresh random nonce.
/// Returns `nonce || ciphertext || tag`.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = cipher_for(key)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CipherError::PayloadTooLarge)?;

    let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt a blob produced by [`encrypt`]. Never returns partial plaintext.
pub fn decrypt(blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = cipher_for(key)?;

    if blob.len() < NONCE_SIZE {
        return Err(CipherError::TruncatedInput);
    }
    let (nonce, sealed) = blob.split_at(NONCE_SIZE);

    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CipherError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::EncryptionKey;

    fn key() -> EncryptionKey {
        EncryptionKey::generate()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = key();
        let samples: [&[u8]; 4] = [b"", b"x", b"Hello from HealthSync!", &[0u8; 4096]];

        for plaintext in samples {
            let blob = encrypt(plaintext, key.as_bytes()).unwrap();
            let decrypted = decrypt(&blob, key.as_bytes()).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn layout_is_nonce_then_sealed_payload() {
        let key = key();
        let plaintext = b"%PDF-1.7 lab results";

        let blob = encrypt(plaintext, key.as_bytes()).unwrap();
        assert_eq!(blob.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
        assert_ne!(&blob[NONCE_SIZE..NONCE_SIZE + plaintext.len()], plaintext);
    }

    #[test]
    fn encryption_uses_fresh_nonce() {
        let key = key();
        let a = encrypt(b"same input", key.as_bytes()).unwrap();
        let b = encrypt(b"same input", key.as_bytes()).unwrap();

        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, key.as_bytes()).unwrap(), decrypt(&b, key.as_bytes()).unwrap());
    }

    #[test]
    fn any_flipped_payload_bit_fails_authentication() {
        let key = key();
        let blob = encrypt(b"blood panel 2024-03", key.as_bytes()).unwrap();

        for byte in NONCE_SIZE..blob.len() {
            for bit in 0..8 {
                let mut tampered = blob.clone();
                tampered[byte] ^= 1 << bit;
                assert_eq!(
                    decrypt(&tampered, key.as_bytes()),
                    Err(CipherError::AuthenticationFailed),
                    "byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn wrong_key_fails() {
        let key1 = key();
        let key2 = key();
        let blob = encrypt(b"Secret record", key1.as_bytes()).unwrap();

        assert_eq!(
            decrypt(&blob, key2.as_bytes()),
            Err(CipherError::AuthenticationFailed)
        );
    }

    #[test]
    fn rejects_every_key_length_but_32() {
        let good = key();
        let blob = encrypt(b"payload", good.as_bytes()).unwrap();

        for len in (0..=64).filter(|len| *len != KEY_SIZE) {
            let bad = vec![7u8; len];
            assert_eq!(encrypt(b"payload", &bad), Err(CipherError::InvalidKeyLength(len)));
            assert_eq!(decrypt(&blob, &bad), Err(CipherError::InvalidKeyLength(len)));
        }
    }

    #[test]
    fn short_blob_is_truncated_input() {
        let key = key();
        for len in 0..NONCE_SIZE {
            assert_eq!(
                decrypt(&vec![0u8; len], key.as_bytes()),
                Err(CipherError::TruncatedInput)
            );
        }
        // Nonce present but no tag: still an authentication failure, not a panic.
        assert_eq!(
            decrypt(&[0u8; NONCE_SIZE], key.as_bytes()),
            Err(CipherError::AuthenticationFailed)
        );
    }
}
