//! Attachment persistence.
//!
//! Audio attachments arrive base64-encoded and are written to the attachment
//! directory under a generated id, never under the sender's filename.

use crate::config::paths::ATTACHMENT_DIR;
use crate::error::Result;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::RngCore;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Extension that marks an attachment as a voicemail recording.
pub const AUDIO_EXTENSION: &str = ".mp3";

/// Whether a filename looks like an audio attachment (case-insensitive).
pub fn is_audio_file(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(AUDIO_EXTENSION)
}

/// Generate an opaque recording id from 128 random bits.
pub fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64 `content` and write it to `path`.
///
/// Line breaks inside the encoded text are ignored. The write is not atomic.
#[instrument(skip(content), fields(path = %path.display()))]
pub async fn save_attachment(content: &str, path: &Path) -> Result<()> {
    let cleaned: String = content.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    let bytes = STANDARD.decode(cleaned.as_bytes())?;
    tokio::fs::write(path, &bytes).await?;
    debug!("Wrote {} bytes", bytes.len());
    Ok(())
}

/// A persisted attachment.
#[derive(Debug, Clone)]
pub struct StoredAttachment {
    pub path: PathBuf,
    pub size: i64,
}

/// Directory-backed store for audio attachments.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl Default for AttachmentStore {
    fn default() -> Self {
        Self::new(ATTACHMENT_DIR)
    }
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the audio file for `id`.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}{}", id, AUDIO_EXTENSION))
    }

    /// Decode and write an attachment, then read back its size from disk.
    pub async fn persist(&self, id: &str, content: &str) -> Result<StoredAttachment> {
        let path = self.path_for(id);
        save_attachment(content, &path).await?;
        let size = tokio::fs::metadata(&path).await?.len() as i64;
        Ok(StoredAttachment { path, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoiceboxError;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file("voicemail.mp3"));
        assert!(is_audio_file("VOICEMAIL.MP3"));
        assert!(is_audio_file("a.b.Mp3"));
        assert!(!is_audio_file("voicemail.wav"));
        assert!(!is_audio_file("mp3"));
        assert!(!is_audio_file("notes.mp3.txt"));
    }

    #[test]
    fn test_generate_id() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 22);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_round_trip_arbitrary_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());
        let original: Vec<u8> = (0..=255u8).cycle().take(1000).collect();

        let stored = store.persist("abc", &STANDARD.encode(&original)).await.unwrap();

        assert_eq!(stored.path, dir.path().join("abc.mp3"));
        assert_eq!(stored.size, 1000);
        assert_eq!(std::fs::read(&stored.path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_empty_content_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());

        let stored = store.persist("empty", "").await.unwrap();

        assert_eq!(stored.size, 0);
        assert!(std::fs::read(&stored.path).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrapped_base64_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapped.mp3");
        let encoded = STANDARD.encode(b"hello voicemail world");
        let wrapped = format!("{}\r\n{}", &encoded[..8], &encoded[8..]);

        save_attachment(&wrapped, &path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello voicemail world");
    }

    #[tokio::test]
    async fn test_invalid_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.mp3");

        let err = save_attachment("not base64!!", &path).await.unwrap_err();
        assert!(matches!(err, VoiceboxError::Decode(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().join("does-not-exist"));

        let err = store.persist("x", &STANDARD.encode(b"data")).await.unwrap_err();
        assert!(matches!(err, VoiceboxError::Io(_)));
    }
}
