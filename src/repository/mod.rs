//! Recording metadata storage.
//!
//! Provides the [`Recording`] model and a trait-based repository interface.

mod sqlite;

pub use sqlite::SqliteRecordingRepository;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp format used for display and for defaulted `receivedAt` values.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format emitted by the mail client, e.g.
/// `Monday, January 2, 2006 at 3:04:05 PM`.
pub const MAIL_CLIENT_FORMAT: &str = "%A, %B %d, %Y at %I:%M:%S %p";

/// Phone number stored when none could be extracted.
pub const UNKNOWN_PHONE: &str = "Unknown";

/// A processed voicemail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Opaque unique id, also the audio file stem.
    pub id: String,
    /// Formatted caller number or [`UNKNOWN_PHONE`].
    pub phone_number: String,
    /// Received timestamp as supplied; normalised when read back.
    pub received_at: String,
    /// Attachment filename as sent.
    pub mp3_file_name: String,
    /// Where the audio bytes live.
    pub file_path: String,
    /// Size of the stored audio in bytes.
    pub file_size: i64,
    pub transcription: String,
    pub title: String,
}

/// Current local time in [`DISPLAY_FORMAT`].
pub fn now_display() -> String {
    Local::now().format(DISPLAY_FORMAT).to_string()
}

/// Re-render a stored `received_at` value in [`DISPLAY_FORMAT`].
///
/// Accepts the mail-client format and the display format itself; anything
/// else is replaced by the current time.
pub fn display_received_at(raw: &str) -> String {
    let raw = raw.trim();
    [MAIL_CLIENT_FORMAT, DISPLAY_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| {
            tracing::warn!("Unparseable received_at {:?}, using current time", raw);
            now_display()
        })
}

/// Trait for recording repositories.
#[async_trait]
pub trait RecordingRepository: Send + Sync {
    /// Insert a fully populated recording. Ids must be unique.
    async fn insert(&self, recording: &Recording) -> Result<()>;

    /// All recordings ordered by stored `received_at` descending, with display timestamps.
    async fn list(&self) -> Result<Vec<Recording>>;

    /// A single recording by id.
    async fn get(&self, id: &str) -> Result<Option<Recording>>;

    /// Stored audio path for a recording id.
    async fn file_path(&self, id: &str) -> Result<Option<String>>;
}
