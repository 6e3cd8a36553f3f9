//! SQLite-backed recording repository.

use super::{display_received_at, Recording, RecordingRepository};
use crate::error::{Result, VoiceboxError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS recordings (
        id TEXT PRIMARY KEY,
        phone_number TEXT NOT NULL,
        received_at TEXT NOT NULL,
        mp3_file_name TEXT NOT NULL,
        file_path TEXT NOT NULL,
        file_size INTEGER NOT NULL,
        transcription TEXT NOT NULL,
        title TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_recordings_received_at ON recordings(received_at);
"#;

const SELECT_COLUMNS: &str = "SELECT id, phone_number, received_at, mp3_file_name, file_path, \
     file_size, transcription, title FROM recordings";

/// SQLite recording repository.
pub struct SqliteRecordingRepository {
    conn: Mutex<Connection>,
}

impl SqliteRecordingRepository {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Concurrent readers alongside the single writer
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized recording store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VoiceboxError::Storage(format!("Failed to acquire store lock: {}", e)))
    }

    fn row_to_recording(row: &Row<'_>) -> rusqlite::Result<Recording> {
        let received_at: String = row.get(2)?;
        Ok(Recording {
            id: row.get(0)?,
            phone_number: row.get(1)?,
            received_at: display_received_at(&received_at),
            mp3_file_name: row.get(3)?,
            file_path: row.get(4)?,
            file_size: row.get(5)?,
            transcription: row.get(6)?,
            title: row.get(7)?,
        })
    }
}

#[async_trait]
impl RecordingRepository for SqliteRecordingRepository {
    #[instrument(skip(self, recording), fields(id = %recording.id))]
    async fn insert(&self, recording: &Recording) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO recordings
            (id, phone_number, received_at, mp3_file_name, file_path, file_size, transcription, title)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                recording.id,
                recording.phone_number,
                recording.received_at,
                recording.mp3_file_name,
                recording.file_path,
                recording.file_size,
                recording.transcription,
                recording.title,
            ],
        )?;

        debug!("Inserted recording");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Recording>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!("{} ORDER BY received_at DESC", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], Self::row_to_recording)?;

        let mut recordings = Vec::new();
        for row in rows {
            match row {
                Ok(recording) => recordings.push(recording),
                Err(e) => warn!("Skipping unreadable recording row: {}", e),
            }
        }

        debug!("Listed {} recordings", recordings.len());
        Ok(recordings)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Recording>> {
        let conn = self.lock()?;

        let recording = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_recording,
            )
            .optional()?;

        Ok(recording)
    }

    #[instrument(skip(self))]
    async fn file_path(&self, id: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        let path = conn
            .query_row(
                "SELECT file_path FROM recordings WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(id: &str, received_at: &str) -> Recording {
        Recording {
            id: id.to_string(),
            phone_number: "(415) 555-1234".to_string(),
            received_at: received_at.to_string(),
            mp3_file_name: format!("{}.mp3", id),
            file_path: format!("./data/mp3s/{}.mp3", id),
            file_size: 1024,
            transcription: "Call me back".to_string(),
            title: "Callback request".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_list() {
        let repo = SqliteRecordingRepository::in_memory().unwrap();
        let recordings = repo.list().await.unwrap();
        assert!(recordings.is_empty());
        assert_eq!(serde_json::to_string(&recordings).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = SqliteRecordingRepository::in_memory().unwrap();
        let rec = recording("a1", "2024-03-15 09:05:00");
        repo.insert(&rec).await.unwrap();

        assert_eq!(repo.get("a1").await.unwrap(), Some(rec));
        assert_eq!(
            repo.file_path("a1").await.unwrap().as_deref(),
            Some("./data/mp3s/a1.mp3")
        );
        assert!(repo.get("missing").await.unwrap().is_none());
        assert!(repo.file_path("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = SqliteRecordingRepository::in_memory().unwrap();
        repo.insert(&recording("dup", "2024-03-15 09:05:00")).await.unwrap();

        let err = repo.insert(&recording("dup", "2024-03-16 09:05:00")).await;
        assert!(matches!(err, Err(VoiceboxError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_order_and_normalisation() {
        let repo = SqliteRecordingRepository::in_memory().unwrap();
        repo.insert(&recording("old", "2024-01-01 08:00:00")).await.unwrap();
        repo.insert(&recording("new", "2024-06-01 08:00:00")).await.unwrap();
        repo.insert(&recording("mid", "2024-03-01 08:00:00")).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_mail_client_timestamp_rendered() {
        let repo = SqliteRecordingRepository::in_memory().unwrap();
        repo.insert(&recording("m", "Monday, January 2, 2006 at 3:04:05 PM"))
            .await
            .unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].received_at, "2006-01-02 15:04:05");
    }

    #[tokio::test]
    async fn test_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recordings.db");

        {
            let repo = SqliteRecordingRepository::new(&path).unwrap();
            repo.insert(&recording("disk", "2024-03-15 09:05:00")).await.unwrap();
        }

        let reopened = SqliteRecordingRepository::new(&path).unwrap();
        assert_eq!(reopened.list().await.unwrap().len(), 1);
    }
}
