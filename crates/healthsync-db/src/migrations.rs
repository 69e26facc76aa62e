use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            fcm_token   TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS encrypted_files (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            file_name   TEXT NOT NULL,
            file_data   BLOB NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_encrypted_files_user
            ON encrypted_files(user_id, created_at);

        -- time_to_notify is UTC 'HH:MM:SS' so text comparison orders correctly
        CREATE TABLE IF NOT EXISTS medications (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            medication_name TEXT NOT NULL,
            dosage          TEXT NOT NULL,
            time_to_notify  TEXT NOT NULL,
            frequency       TEXT NOT NULL,
            is_read         INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_medications_due
            ON medications(is_read, time_to_notify);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
