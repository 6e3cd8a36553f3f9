//! Transcription module for Voicebox.
//!
//! Turns a persisted voicemail into plain text. The production backend shells
//! out to ffmpeg and whisper.cpp; [`CannedTranscriber`] returns fixed results
//! so the ingestion pipeline can be exercised without either tool.

mod canned;
mod tool;
mod whisper_cpp;

pub use canned::CannedTranscriber;
pub use tool::ExternalTool;
pub use whisper_cpp::WhisperCppTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into trimmed text.
    ///
    /// An empty string is a valid result (no speech detected).
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
