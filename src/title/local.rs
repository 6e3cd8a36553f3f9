//! Title generation through a local OpenAI-compatible chat service (Ollama).

use super::{clean_title, TitleGenerator};
use crate::config::paths::TITLE_API_BASE;
use crate::config::TitleSettings;
use crate::error::{Result, VoiceboxError};
use crate::openai::{ChatClient, ChatMessage, ChatRequest};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates very short, clear titles \
for voicemail transcriptions. Keep your titles under 8 words, be descriptive but concise, focusing \
on the main point. Don't use quotes in your response and only return the title, no other text \
preceded by a colon.";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 50;

/// Chat-completion backed title generator.
pub struct LocalChatTitleGenerator {
    client: ChatClient,
    model: String,
}

impl LocalChatTitleGenerator {
    /// Generator against the fixed local endpoint.
    pub fn new(settings: &TitleSettings) -> Result<Self> {
        Self::with_endpoint(TITLE_API_BASE, &settings.model, settings.timeout())
    }

    /// Generator against an arbitrary OpenAI-compatible base URL.
    pub fn with_endpoint(api_base: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(api_base, timeout)?,
            model: model.to_string(),
        })
    }

    fn build_request(&self, transcript: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Please create a title for this voicemail transcription:\n\n{}",
                    transcript
                )),
            ],
            temperature: TEMPERATURE,
            max_tokens: Some(MAX_TOKENS),
        }
    }
}

#[async_trait]
impl TitleGenerator for LocalChatTitleGenerator {
    #[instrument(skip(self, transcript), fields(model = %self.model, chars = transcript.len()))]
    async fn generate(&self, transcript: &str) -> Result<String> {
        let request = self.build_request(transcript);
        let response = self.client.complete(&request).await?;

        let raw = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| VoiceboxError::Title("No choices in completion response".to_string()))?;

        debug!("Raw title response: {:?}", raw);

        clean_title(raw)
            .ok_or_else(|| VoiceboxError::Title("Empty title after cleanup".to_string()))
    }
}
