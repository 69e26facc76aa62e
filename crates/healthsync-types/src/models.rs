use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored medical file. `ciphertext` is always `nonce || sealed payload`,
/// never the plaintext.
#[derive(Debug, Clone)]
pub struct ProtectedRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_name: String,
    pub ciphertext: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Record metadata, listed without decrypting anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: Uuid,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(anyhow::anyhow!("Unknown frequency: {}", other)),
        }
    }
}

/// A medication reminder.
///
/// `time_to_notify` is a UTC wall-clock time with no date component.
/// `already_notified` only ever moves false -> true from the scheduler's side;
/// the owner can re-arm it explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    pub time_to_notify: NaiveTime,
    pub frequency: Frequency,
    pub already_notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Opaque push address (device token) for an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub token: String,
}

impl DeliveryTarget {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}
