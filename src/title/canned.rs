//! Fixed-result title generator.

use super::TitleGenerator;
use crate::error::{Result, VoiceboxError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Title generator that returns a preset title or failure and records the
/// transcripts it received.
pub struct CannedTitleGenerator {
    outcome: std::result::Result<String, String>,
    calls: Mutex<Vec<String>>,
}

impl CannedTitleGenerator {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            outcome: Ok(title.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Transcripts passed to `generate`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TitleGenerator for CannedTitleGenerator {
    async fn generate(&self, transcript: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(transcript.to_string());
        }
        self.outcome.clone().map_err(VoiceboxError::Title)
    }
}
