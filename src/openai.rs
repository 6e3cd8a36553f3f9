//! Minimal client for OpenAI-compatible chat completion endpoints.
//!
//! Used against a local Ollama instance, so no API key is sent.

use crate::error::{Result, VoiceboxError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat completion client bound to one base URL.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_base: String,
}

impl ChatClient {
    /// Client for an arbitrary OpenAI-compatible base URL (ending in `/v1`).
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoiceboxError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Send a chat completion request.
    ///
    /// Transport failures, non-2xx statuses and undecodable bodies are errors.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.api_base);
        let response = self.http.post(&url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(VoiceboxError::OpenAI(format!(
                "API error (status {}): {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "Completion used {} prompt + {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(parsed)
    }
}
