//! Voicebox - voicemail inbox
//!
//! Turns voicemail emails into a searchable, playable record.
//!
//! # Overview
//!
//! A mail automation POSTs each new voicemail email (subject, sender, received
//! time and base64 attachments) to the webhook. Voicebox then:
//! - extracts the caller's number from the subject line
//! - stores the first MP3 attachment under a generated id
//! - transcribes it locally with ffmpeg and whisper.cpp
//! - asks a local chat model for a short title
//! - records the result in SQLite for the listing and playback endpoints
//!
//! Transcription and titling are best-effort: a recording whose enrichment
//! fails is still stored with placeholder values.
//!
//! # Architecture
//!
//! - `config` - Settings and fixed paths
//! - `phone` - Phone number extraction
//! - `attachment` - Attachment decoding and storage
//! - `transcription` - Speech-to-text backends
//! - `title` - Title generation backends
//! - `repository` - Recording metadata store
//! - `ingest` - The ingestion pipeline
//! - `api` - HTTP routes
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voicebox::attachment::AttachmentStore;
//! use voicebox::ingest::{parse_payload, IngestPipeline};
//! use voicebox::repository::SqliteRecordingRepository;
//! use voicebox::title::CannedTitleGenerator;
//! use voicebox::transcription::CannedTranscriber;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = IngestPipeline::new(
//!         Arc::new(CannedTranscriber::text("Please call me back.")),
//!         Arc::new(CannedTitleGenerator::title("Callback request")),
//!         Arc::new(SqliteRecordingRepository::in_memory()?),
//!         AttachmentStore::new("/tmp/voicebox"),
//!     );
//!
//!     let payload = parse_payload(br#"{"subject": "Voicemail from (415) 555-1234"}"#)?;
//!     let outcome = pipeline.process(payload).await;
//!     println!("Stored recording {:?}", outcome.id);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod attachment;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod openai;
pub mod phone;
pub mod repository;
pub mod title;
pub mod transcription;

pub use error::{Result, VoiceboxError};
