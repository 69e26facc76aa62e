use async_trait::async_trait;
use chrono::NaiveTime;
use healthsync_types::models::{DeliveryTarget, ProtectedRecord, RecordSummary, ReminderItem};
use healthsync_types::store::{RecordStore, ReminderStore, StoreError};
use uuid::Uuid;

use crate::Database;

#[async_trait]
impl RecordStore for Database {
    async fn store_encrypted_blob(
        &self,
        owner_id: Uuid,
        file_name: &str,
        ciphertext: Vec<u8>,
    ) -> Result<Uuid, StoreError> {
        let record_id = Uuid::new_v4();
        let file_name = file_name.to_string();
        self.run_blocking(move |db| db.insert_record(record_id, owner_id, &file_name, &ciphertext))
            .await?;
        Ok(record_id)
    }

    async fn get_encrypted_blob(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<ProtectedRecord>, StoreError> {
        self.run_blocking(move |db| db.get_record(owner_id, record_id)).await
    }

    async fn list_blobs(&self, owner_id: Uuid) -> Result<Vec<RecordSummary>, StoreError> {
        self.run_blocking(move |db| db.list_records(owner_id)).await
    }

    async fn delete_blob(&self, owner_id: Uuid, record_id: Uuid) -> Result<bool, StoreError> {
        self.run_blocking(move |db| db.delete_record(owner_id, record_id)).await
    }
}

#[async_trait]
impl ReminderStore for Database {
    async fn find_due_reminders(&self, up_to: NaiveTime) -> Result<Vec<ReminderItem>, StoreError> {
        self.run_blocking(move |db| db.due_medications(up_to)).await
    }

    async fn get_delivery_target(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<DeliveryTarget>, StoreError> {
        let token = self.run_blocking(move |db| db.get_fcm_token(owner_id)).await?;
        Ok(token.map(DeliveryTarget::new))
    }

    async fn mark_notified(&self, reminder_id: Uuid) -> Result<(), StoreError> {
        // Unknown ids are a no-op, same as re-flipping an already notified row.
        self.run_blocking(move |db| db.set_medication_read(reminder_id, None, true))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use healthsync_types::models::Frequency;

    #[tokio::test]
    async fn reminder_store_flow() {
        let db = Database::open_in_memory().unwrap();
        let owner = Uuid::new_v4();
        db.create_user(&owner.to_string(), "a@example.com", "hash").unwrap();
        db.set_fcm_token(owner, "device-1").unwrap();

        let now = Utc::now();
        let item = ReminderItem {
            id: Uuid::new_v4(),
            owner_id: owner,
            medication_name: "Aspirin".into(),
            dosage: "75mg".into(),
            time_to_notify: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            frequency: Frequency::Daily,
            already_notified: false,
            created_at: now,
            updated_at: now,
        };
        db.create_medication(&item).unwrap();

        let due = db.find_due_reminders(item.time_to_notify).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, item.id);
        assert_eq!(due[0].medication_name, "Aspirin");

        let target = db.get_delivery_target(owner).await.unwrap();
        assert_eq!(target, Some(DeliveryTarget::new("device-1")));

        db.mark_notified(item.id).await.unwrap();
        db.mark_notified(item.id).await.unwrap();
        assert!(db.find_due_reminders(item.time_to_notify).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_store_flow() {
        let db = Database::open_in_memory().unwrap();
        let owner = Uuid::new_v4();
        db.create_user(&owner.to_string(), "a@example.com", "hash").unwrap();

        let id = db.store_encrypted_blob(owner, "labs.pdf", vec![9; 40]).await.unwrap();
        let blob = db.get_encrypted_blob(owner, id).await.unwrap().unwrap();
        assert_eq!(blob.ciphertext, vec![9; 40]);
        assert_eq!(db.list_blobs(owner).await.unwrap()[0].id, id);
        assert!(db.get_encrypted_blob(Uuid::new_v4(), id).await.unwrap().is_none());
        assert!(db.delete_blob(owner, id).await.unwrap());
    }

    #[tokio::test]
    async fn storing_for_unknown_owner_is_a_store_error() {
        let db = Database::open_in_memory().unwrap();
        let result = db.store_encrypted_blob(Uuid::new_v4(), "x.pdf", vec![1]).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
