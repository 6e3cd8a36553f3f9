//! Fixed-result transcriber.

use super::Transcriber;
use crate::error::{Result, VoiceboxError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Transcriber that returns a preset transcript or failure and records the
/// paths it was asked to transcribe.
pub struct CannedTranscriber {
    outcome: std::result::Result<String, String>,
    calls: Mutex<Vec<PathBuf>>,
}

impl CannedTranscriber {
    /// Always succeed with `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with a transcription error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Paths passed to `transcribe`, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transcriber for CannedTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(audio_path.to_path_buf());
        }
        self.outcome
            .clone()
            .map_err(VoiceboxError::Transcription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_outcomes() {
        let ok = CannedTranscriber::text("hello");
        assert_eq!(ok.transcribe(Path::new("a.mp3")).await.unwrap(), "hello");
        assert_eq!(ok.calls(), vec![PathBuf::from("a.mp3")]);

        let failing = CannedTranscriber::failing("no engine");
        let err = failing.transcribe(Path::new("b.mp3")).await.unwrap_err();
        assert_eq!(err.to_string(), "Transcription failed: no engine");
    }
}
