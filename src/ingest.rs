//! Voicemail ingestion pipeline.
//!
//! Takes a parsed email, saves its first usable MP3 attachment, enriches it
//! with a transcript and a title, and records the result. Enrichment failures
//! degrade the stored record instead of failing the request.

use crate::attachment::{generate_id, is_audio_file, AttachmentStore};
use crate::error::{Result, VoiceboxError};
use crate::phone::PhoneExtractor;
use crate::repository::{now_display, Recording, RecordingRepository, UNKNOWN_PHONE};
use crate::title::{title_or_default, TitleGenerator, DEFAULT_TITLE};
use crate::transcription::Transcriber;
use regex::bytes::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, error, info, instrument, warn};

/// Narrow no-break space (U+202F) as UTF-8. Mail clients put it between the
/// time and AM/PM in formatted dates.
static NARROW_NBSP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)\xE2\x80\xAF").expect("narrow no-break space pattern is valid"));

/// Prefix stored as the transcription when transcription fails.
pub const TRANSCRIPTION_FAILED_PREFIX: &str = "Transcription failed: ";

/// An inbound email as posted by the mail automation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailPayload {
    pub subject: String,
    pub sender: String,
    pub received_at: String,
    pub attachments: Vec<AttachmentData>,
}

/// A single email attachment with base64 content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentData {
    pub file_name: String,
    pub content: String,
    pub mime_type: String,
}

/// Replace every narrow no-break space in a raw body with a plain space.
pub fn normalize_body(raw: &[u8]) -> Vec<u8> {
    NARROW_NBSP.replace_all(raw, &b" "[..]).into_owned()
}

/// Normalise and deserialize a webhook body.
pub fn parse_payload(raw: &[u8]) -> Result<EmailPayload> {
    let body = normalize_body(raw);
    let payload = serde_json::from_slice(&body)?;
    Ok(payload)
}

/// Result of processing one email.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Id of the saved recording, empty when no attachment was saved.
    pub id: String,
    /// The record as inserted (or as attempted, if the insert failed).
    pub recording: Option<Recording>,
}

/// The ingestion pipeline and its collaborators.
pub struct IngestPipeline {
    transcriber: Arc<dyn Transcriber>,
    titler: Arc<dyn TitleGenerator>,
    repository: Arc<dyn RecordingRepository>,
    attachments: AttachmentStore,
    phone: PhoneExtractor,
}

impl IngestPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        titler: Arc<dyn TitleGenerator>,
        repository: Arc<dyn RecordingRepository>,
        attachments: AttachmentStore,
    ) -> Self {
        Self {
            transcriber,
            titler,
            repository,
            attachments,
            phone: PhoneExtractor::default(),
        }
    }

    /// Replace the phone extractor (e.g. to disable caller overrides).
    pub fn with_phone_extractor(mut self, phone: PhoneExtractor) -> Self {
        self.phone = phone;
        self
    }

    pub fn repository(&self) -> Arc<dyn RecordingRepository> {
        self.repository.clone()
    }

    /// Process an email end to end.
    ///
    /// Only the first MP3 attachment that saves successfully is used.
    #[instrument(skip(self, payload), fields(attachments = payload.attachments.len()))]
    pub async fn process(&self, payload: EmailPayload) -> IngestOutcome {
        let received_at = if payload.received_at.is_empty() {
            now_display()
        } else {
            payload.received_at.clone()
        };

        let mut phone_number = self.phone.extract(&payload.subject);
        if phone_number.is_empty() {
            info!("Could not extract phone number from subject: {:?}", payload.subject);
            phone_number = UNKNOWN_PHONE.to_string();
        }

        info!("Processing email with {} attachments", payload.attachments.len());

        for attachment in &payload.attachments {
            debug!("Considering attachment: {}", attachment.file_name);
            if !is_audio_file(&attachment.file_name) {
                continue;
            }
            info!("Found MP3 attachment: {}", attachment.file_name);

            let id = generate_id();
            let stored = match self.attachments.persist(&id, &attachment.content).await {
                Ok(stored) => stored,
                Err(e) => {
                    error!("Error saving attachment {}: {}", attachment.file_name, e);
                    continue;
                }
            };
            info!("Saved attachment to {:?} ({} bytes)", stored.path, stored.size);

            let (transcription, title) = self.enrich(&stored.path).await;

            let recording = Recording {
                id: id.clone(),
                phone_number,
                received_at,
                mp3_file_name: attachment.file_name.clone(),
                file_path: stored.path.to_string_lossy().into_owned(),
                file_size: stored.size,
                transcription,
                title,
            };

            match self.repository.insert(&recording).await {
                Ok(()) => info!("Saved recording to database: {}", id),
                Err(e) => error!("Error saving recording to database: {}", e),
            }

            return IngestOutcome {
                id,
                recording: Some(recording),
            };
        }

        info!("No MP3 attachment saved");
        IngestOutcome {
            id: String::new(),
            recording: None,
        }
    }

    /// Transcribe, then title if there is something to title.
    async fn enrich(&self, audio_path: &Path) -> (String, String) {
        info!("Transcribing audio file: {:?}", audio_path);
        match self.transcriber.transcribe(audio_path).await {
            Err(e) => {
                warn!("Error transcribing audio: {}", e);
                (transcription_placeholder(&e), DEFAULT_TITLE.to_string())
            }
            Ok(text) if text.is_empty() => {
                info!("Empty transcription, skipping title generation");
                (text, DEFAULT_TITLE.to_string())
            }
            Ok(text) => {
                info!("Transcription successful ({} characters)", text.len());
                let title = title_or_default(self.titler.as_ref(), &text).await;
                (text, title)
            }
        }
    }
}

fn transcription_placeholder(err: &VoiceboxError) -> String {
    match err {
        VoiceboxError::Transcription(msg) => format!("{}{}", TRANSCRIPTION_FAILED_PREFIX, msg),
        other => format!("{}{}", TRANSCRIPTION_FAILED_PREFIX, other),
    }
}
