use crate::Database;
use crate::models::{
    EncryptedFileRow, MedicationRow, UserRow, parse_id, parse_timestamp, timestamp,
};
use anyhow::Result;
use chrono::{NaiveTime, Utc};
use healthsync_types::models::{ProtectedRecord, RecordSummary, ReminderItem};
use healthsync_types::time::format_time_of_day;
use rusqlite::{Connection, Row};
use uuid::Uuid;

const MEDICATION_COLUMNS: &str = "id, user_id, medication_name, dosage, time_to_notify, frequency, is_read, created_at, updated_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id, email, password_hash, timestamp(Utc::now())),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    /// Returns false if the user does not exist.
    pub fn set_fcm_token(&self, user_id: Uuid, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET fcm_token = ?2 WHERE id = ?1",
                (user_id.to_string(), token),
            )?;
            Ok(updated > 0)
        })
    }

    /// Missing users and blank tokens both come back as `None`.
    pub fn get_fcm_token(&self, user_id: Uuid) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let token: Option<Option<String>> = conn
                .query_row(
                    "SELECT fcm_token FROM users WHERE id = ?1",
                    [user_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(token.flatten().filter(|t| !t.trim().is_empty()))
        })
    }

    // -- Encrypted files --

    pub fn insert_record(
        &self,
        id: Uuid,
        owner_id: Uuid,
        file_name: &str,
        ciphertext: &[u8],
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO encrypted_files (id, user_id, file_name, file_data, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    id.to_string(),
                    owner_id.to_string(),
                    file_name,
                    ciphertext,
                    timestamp(Utc::now()),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_record(&self, owner_id: Uuid, record_id: Uuid) -> Result<Option<ProtectedRecord>> {
        let row = self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, file_name, file_data, created_at FROM encrypted_files WHERE id = ?1 AND user_id = ?2",
                [record_id.to_string(), owner_id.to_string()],
                |row| {
                    Ok(EncryptedFileRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        file_name: row.get(2)?,
                        file_data: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })?;

        row.map(ProtectedRecord::try_from).transpose()
    }

    pub fn list_records(&self, owner_id: Uuid) -> Result<Vec<RecordSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, file_name, created_at FROM encrypted_files WHERE user_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([owner_id.to_string()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, file_name, created_at)| -> Result<RecordSummary> {
                    Ok(RecordSummary {
                        id: parse_id(&id)?,
                        file_name,
                        created_at: parse_timestamp(&created_at)?,
                    })
                })
                .collect()
        })
    }

    pub fn delete_record(&self, owner_id: Uuid, record_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM encrypted_files WHERE id = ?1 AND user_id = ?2",
                [record_id.to_string(), owner_id.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }

    // -- Medications --

    pub fn create_medication(&self, item: &ReminderItem) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO medications (id, user_id, medication_name, dosage, time_to_notify, frequency, is_read, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    item.id.to_string(),
                    item.owner_id.to_string(),
                    item.medication_name,
                    item.dosage,
                    format_time_of_day(item.time_to_notify),
                    item.frequency.as_str(),
                    item.already_notified,
                    timestamp(item.created_at),
                    timestamp(item.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_medications(&self, owner_id: Uuid) -> Result<Vec<ReminderItem>> {
        let rows = self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM medications WHERE user_id = ?1 ORDER BY time_to_notify",
                MEDICATION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id.to_string()], medication_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(ReminderItem::try_from).collect()
    }

    /// Unnotified medications scheduled at or before `up_to` (UTC time of day).
    /// Both sides are compared as `HH:MM`; stored seconds are ignored.
    pub fn due_medications(&self, up_to: NaiveTime) -> Result<Vec<ReminderItem>> {
        let rows = self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM medications WHERE is_read = 0 AND substr(time_to_notify, 1, 5) <= ?1",
                MEDICATION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([up_to.format("%H:%M").to_string()], medication_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(ReminderItem::try_from).collect()
    }

    /// Set the read/notified flag. Scoped to `owner_id` when given.
    /// Returns false when no row matched; re-setting the same value still matches.
    pub fn set_medication_read(
        &self,
        medication_id: Uuid,
        owner_id: Option<Uuid>,
        read: bool,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let now = timestamp(Utc::now());
            let updated = match owner_id {
                Some(owner_id) => conn.execute(
                    "UPDATE medications SET is_read = ?3, updated_at = ?4 WHERE id = ?1 AND user_id = ?2",
                    rusqlite::params![medication_id.to_string(), owner_id.to_string(), read, now],
                )?,
                None => conn.execute(
                    "UPDATE medications SET is_read = ?2, updated_at = ?3 WHERE id = ?1",
                    rusqlite::params![medication_id.to_string(), read, now],
                )?,
            };
            Ok(updated > 0)
        })
    }

    pub fn get_medication(&self, medication_id: Uuid) -> Result<Option<ReminderItem>> {
        let row = self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM medications WHERE id = ?1", MEDICATION_COLUMNS);
            conn.query_row(&sql, [medication_id.to_string()], medication_row)
                .optional()
        })?;

        row.map(ReminderItem::try_from).transpose()
    }
}

fn medication_row(row: &Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        medication_name: row.get(2)?,
        dosage: row.get(3)?,
        time_to_notify: row.get(4)?,
        frequency: row.get(5)?,
        is_read: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn
        .prepare("SELECT id, email, password, fcm_token, created_at FROM users WHERE email = ?1")?;

    let row = stmt
        .query_row([email], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                fcm_token: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
