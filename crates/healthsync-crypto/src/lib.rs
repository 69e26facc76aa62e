//! HealthSync Crypto Library
//!
//! Authenticated symmetric encryption (AES-256-GCM) for medical records at rest.
//! Every ciphertext is self-describing: the random 96-bit nonce is prepended to
//! the sealed payload, so a blob plus the key is all `decrypt` needs.

pub mod cipher;
pub mod keys;

pub use cipher::{CipherError, KEY_SIZE, NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
pub use keys::EncryptionKey;
