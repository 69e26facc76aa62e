use std::sync::Arc;

use healthsync_crypto::{CipherError, EncryptionKey, decrypt, encrypt};
use healthsync_types::models::RecordSummary;
use healthsync_types::store::{RecordStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::content_type::content_type_for;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A decrypted record, ready to hand back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedRecord {
    pub file_name: String,
    pub plaintext: Vec<u8>,
}

impl RetrievedRecord {
    pub fn content_type(&self) -> &'static str {
        content_type_for(&self.file_name, &self.plaintext)
    }
}

/// Bridges plaintext callers to a ciphertext-only [`RecordStore`].
#[derive(Clone)]
pub struct ProtectedRecordStore {
    store: Arc<dyn RecordStore>,
    key: EncryptionKey,
}

impl ProtectedRecordStore {
    pub fn new(store: Arc<dyn RecordStore>, key: &EncryptionKey) -> Self {
        Self {
            store,
            key: key.clone(),
        }
    }

    /// Encrypt and persist a file. The key is checked before the store is touched.
    pub async fn store(
        &self,
        owner_id: Uuid,
        file_name: &str,
        plaintext: &[u8],
    ) -> Result<Uuid, RecordError> {
        self.key.validate()?;

        let ciphertext = encrypt(plaintext, self.key.as_bytes())?;
        let record_id = self
            .store
            .store_encrypted_blob(owner_id, file_name, ciphertext)
            .await?;

        info!(
            "Stored record {} for {}: {} bytes",
            record_id,
            owner_id,
            plaintext.len()
        );
        Ok(record_id)
    }

    pub async fn retrieve(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
    ) -> Result<RetrievedRecord, RecordError> {
        let record = self
            .store
            .get_encrypted_blob(owner_id, record_id)
            .await?
            .ok_or(RecordError::NotFound)?;

        let plaintext = decrypt(&record.ciphertext, self.key.as_bytes()).map_err(|e| {
            warn!("Record {} for {} failed decryption: {}", record_id, owner_id, e);
            e
        })?;

        Ok(RetrievedRecord {
            file_name: record.file_name,
            plaintext,
        })
    }

    /// Metadata only; nothing is decrypted. An empty list is not an error.
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<RecordSummary>, RecordError> {
        Ok(self.store.list_blobs(owner_id).await?)
    }

    pub async fn delete(&self, owner_id: Uuid, record_id: Uuid) -> Result<(), RecordError> {
        if !self.store.delete_blob(owner_id, record_id).await? {
            return Err(RecordError::NotFound);
        }
        info!("Deleted record {} for {}", record_id, owner_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use healthsync_crypto::{NONCE_SIZE, TAG_SIZE};
    use healthsync_types::models::ProtectedRecord;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<Uuid, ProtectedRecord>>,
        writes: AtomicUsize,
    }

    impl MemoryStore {
        fn ciphertext(&self, id: Uuid) -> Vec<u8> {
            self.rows.lock().unwrap()[&id].ciphertext.clone()
        }

        fn corrupt(&self, id: Uuid, index: usize) {
            self.rows.lock().unwrap().get_mut(&id).unwrap().ciphertext[index] ^= 0x01;
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn store_encrypted_blob(
            &self,
            owner_id: Uuid,
            file_name: &str,
            ciphertext: Vec<u8>,
        ) -> Result<Uuid, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let id = Uuid::new_v4();
            self.rows.lock().unwrap().insert(
                id,
                ProtectedRecord {
                    id,
                    owner_id,
                    file_name: file_name.to_string(),
                    ciphertext,
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        }

        async fn get_encrypted_blob(
            &self,
            owner_id: Uuid,
            record_id: Uuid,
        ) -> Result<Option<ProtectedRecord>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&record_id)
                .filter(|r| r.owner_id == owner_id)
                .cloned())
        }

        async fn list_blobs(&self, owner_id: Uuid) -> Result<Vec<RecordSummary>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.owner_id == owner_id)
                .map(|r| RecordSummary {
                    id: r.id,
                    file_name: r.file_name.clone(),
                    created_at: r.created_at,
                })
                .collect())
        }

        async fn delete_blob(&self, owner_id: Uuid, record_id: Uuid) -> Result<bool, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get(&record_id) {
                Some(r) if r.owner_id == owner_id => {
                    rows.remove(&record_id);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    fn setup() -> (Arc<MemoryStore>, ProtectedRecordStore) {
        let backing = Arc::new(MemoryStore::default());
        let records = ProtectedRecordStore::new(backing.clone(), &EncryptionKey::generate());
        (backing, records)
    }

    fn pdf_bytes() -> Vec<u8> {
        let mut bytes = vec![0x25, 0x50, 0x44, 0x46, 0x2D, 0x31, 0x2E, 0x37];
        bytes.extend(std::iter::repeat_n(0xAB, 256));
        bytes
    }

    #[tokio::test]
    async fn upload_then_retrieve_returns_original_bytes() {
        let (backing, records) = setup();
        let owner = Uuid::new_v4();
        let plaintext = pdf_bytes();

        let id = records.store(owner, "report.pdf", &plaintext).await.unwrap();

        let stored = backing.ciphertext(id);
        assert_ne!(stored, plaintext);
        assert!(stored.len() >= plaintext.len() + NONCE_SIZE + TAG_SIZE);
        assert!(!stored.windows(plaintext.len()).any(|w| w == plaintext.as_slice()));

        let record = records.retrieve(owner, id).await.unwrap();
        assert_eq!(record.file_name, "report.pdf");
        assert_eq!(record.plaintext, plaintext);
        assert_eq!(record.content_type(), "application/pdf");
    }

    #[tokio::test]
    async fn unknown_or_foreign_record_is_not_found() {
        let (_, records) = setup();
        let owner = Uuid::new_v4();
        let id = records.store(owner, "a.txt", b"hello").await.unwrap();

        assert!(matches!(
            records.retrieve(owner, Uuid::new_v4()).await,
            Err(RecordError::NotFound)
        ));
        assert!(matches!(
            records.retrieve(Uuid::new_v4(), id).await,
            Err(RecordError::NotFound)
        ));
    }

    #[tokio::test]
    async fn bad_key_is_rejected_before_any_write() {
        let backing = Arc::new(MemoryStore::default());
        let records = ProtectedRecordStore::new(backing.clone(), &EncryptionKey::from_bytes(vec![1u8; 16]));

        let result = records.store(Uuid::new_v4(), "a.pdf", b"data").await;
        assert!(matches!(
            result,
            Err(RecordError::Cipher(CipherError::InvalidKeyLength(16)))
        ));
        assert_eq!(backing.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tampered_ciphertext_fails_closed() {
        let (backing, records) = setup();
        let owner = Uuid::new_v4();
        let id = records.store(owner, "a.pdf", &pdf_bytes()).await.unwrap();

        backing.corrupt(id, NONCE_SIZE + 3);

        assert!(matches!(
            records.retrieve(owner, id).await,
            Err(RecordError::Cipher(CipherError::AuthenticationFailed))
        ));
    }

    #[tokio::test]
    async fn rotated_key_fails_closed_but_listing_still_works() {
        let backing = Arc::new(MemoryStore::default());
        let before = ProtectedRecordStore::new(backing.clone(), &EncryptionKey::generate());
        let after = ProtectedRecordStore::new(backing.clone(), &EncryptionKey::generate());
        let owner = Uuid::new_v4();
        let id = before.store(owner, "a.pdf", b"data").await.unwrap();

        assert!(matches!(
            after.retrieve(owner, id).await,
            Err(RecordError::Cipher(CipherError::AuthenticationFailed))
        ));

        let listed = after.list_for_owner(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_name, "a.pdf");
        assert!(after.list_for_owner(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_whole_record() {
        let (_, records) = setup();
        let owner = Uuid::new_v4();
        let id = records.store(owner, "a.pdf", b"data").await.unwrap();

        assert!(matches!(records.delete(Uuid::new_v4(), id).await, Err(RecordError::NotFound)));
        records.delete(owner, id).await.unwrap();
        assert!(matches!(records.retrieve(owner, id).await, Err(RecordError::NotFound)));
    }
}
