//! Database row types. These map directly to SQLite rows; conversions into
//! the healthsync-types domain models parse ids, times and timestamps.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use healthsync_types::models::{ProtectedRecord, ReminderItem};
use uuid::Uuid;

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub fcm_token: Option<String>,
    pub created_at: String,
}

pub struct EncryptedFileRow {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub file_data: Vec<u8>,
    pub created_at: String,
}

pub struct MedicationRow {
    pub id: String,
    pub user_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub time_to_notify: String,
    pub frequency: String,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Bad timestamp in DB: {}", value))?
        .with_timezone(&Utc))
}

pub(crate) fn parse_id(value: &str) -> Result<Uuid> {
    value
        .parse()
        .with_context(|| format!("Bad id in DB: {}", value))
}

impl TryFrom<EncryptedFileRow> for ProtectedRecord {
    type Error = anyhow::Error;

    fn try_from(row: EncryptedFileRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id)?,
            owner_id: parse_id(&row.user_id)?,
            file_name: row.file_name,
            ciphertext: row.file_data,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

impl TryFrom<MedicationRow> for ReminderItem {
    type Error = anyhow::Error;

    fn try_from(row: MedicationRow) -> Result<Self> {
        let time_to_notify = NaiveTime::parse_from_str(&row.time_to_notify, "%H:%M:%S")
            .with_context(|| format!("Bad time_to_notify in DB: {}", row.time_to_notify))?;

        Ok(Self {
            id: parse_id(&row.id)?,
            owner_id: parse_id(&row.user_id)?,
            medication_name: row.medication_name,
            dosage: row.dosage,
            time_to_notify,
            frequency: row.frequency.parse()?,
            already_notified: row.is_read,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}
