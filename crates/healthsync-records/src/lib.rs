//! Encrypt-on-write, decrypt-on-read storage for medical files.
//!
//! The backing [`RecordStore`](healthsync_types::store::RecordStore) only ever
//! sees ciphertext.

pub mod content_type;
pub mod store;

pub use content_type::content_type_for;
pub use store::{ProtectedRecordStore, RecordError, RetrievedRecord};
