use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Frequency, RecordSummary, ReminderItem};
use crate::time::format_time_of_day;

// -- JWT Claims --

/// Bearer token claims. `sub` is the owner id for records and reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceTokenRequest {
    pub token: String,
}

// -- Records --

#[derive(Debug, Deserialize)]
pub struct UploadRecordQuery {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadRecordResponse {
    pub record_id: Uuid,
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub owner_id: Uuid,
    pub records: Vec<RecordSummary>,
}

// -- Medications --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMedicationRequest {
    pub medication_name: String,
    pub dosage: String,
    /// `HH:MM` or `HH:MM:SS`, in the zone given by `utc_offset` (UTC if absent).
    pub time_to_notify: String,
    pub frequency: Frequency,
    pub utc_offset: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MedicationResponse {
    pub id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    /// Always UTC, `HH:MM:SS`.
    pub time_to_notify: String,
    pub frequency: Frequency,
    pub already_notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReminderItem> for MedicationResponse {
    fn from(item: ReminderItem) -> Self {
        Self {
            id: item.id,
            medication_name: item.medication_name,
            dosage: item.dosage,
            time_to_notify: format_time_of_day(item.time_to_notify),
            frequency: item.frequency,
            already_notified: item.already_notified,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MedicationListResponse {
    pub medications: Vec<MedicationResponse>,
}

// -- Generic bodies --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
