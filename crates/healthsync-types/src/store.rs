//! Data store seams consumed by the record store and the reminder scheduler.
//!
//! Implementations own their concurrency control; callers hold a shared
//! reference for the duration of each call and never lock around it.

use async_trait::async_trait;
use chrono::NaiveTime;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DeliveryTarget, ProtectedRecord, RecordSummary, ReminderItem};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    #[error("data store error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn store_encrypted_blob(
        &self,
        owner_id: Uuid,
        file_name: &str,
        ciphertext: Vec<u8>,
    ) -> Result<Uuid, StoreError>;

    async fn get_encrypted_blob(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<ProtectedRecord>, StoreError>;

    async fn list_blobs(&self, owner_id: Uuid) -> Result<Vec<RecordSummary>, StoreError>;

    /// Returns false when no row matched `(owner_id, record_id)`.
    async fn delete_blob(&self, owner_id: Uuid, record_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Unnotified reminders whose time of day, taken at minute resolution, is
    /// at or before `up_to` (UTC). A reminder set for 09:00:30 is due at 09:00.
    async fn find_due_reminders(&self, up_to: NaiveTime) -> Result<Vec<ReminderItem>, StoreError>;

    async fn get_delivery_target(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<DeliveryTarget>, StoreError>;

    /// Idempotent: flipping an already-notified reminder is a no-op.
    async fn mark_notified(&self, reminder_id: Uuid) -> Result<(), StoreError>;
}
