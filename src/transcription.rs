//! Audio transcription passthrough.
//!
//! Uploads raw audio to an OpenAI-compatible `/audio/transcriptions`
//! endpoint and returns the recognized text. No retry and no audio
//! format validation; the endpoint rejects what it cannot decode.

use reqwest::multipart;
use tracing::debug;

use crate::config::Config;
use crate::error::{CatapultError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Transcribes audio bytes against a single OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct Transcriber {
    api_key: String,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl Transcriber {
    /// Build from config.
    ///
    /// Returns a `Config` error when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .openai
            .api_key
            .clone()
            .ok_or_else(|| CatapultError::Config("openai.api_key is not set".into()))?;
        let api_base = config
            .openai
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Ok(Self {
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: config.transcription.model.clone(),
            client: reqwest::Client::new(),
        })
    }

    /// Transcribe raw audio bytes and return the recognized text.
    pub async fn transcribe(&self, audio: Vec<u8>, content_type: &str) -> Result<String> {
        let file_part = multipart::Part::bytes(audio)
            .file_name("voice.ogg")
            .mime_str(content_type)
            .map_err(|e| CatapultError::Transcription(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        let url = format!("{}/audio/transcriptions", self.api_base);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CatapultError::Transcription(format!(
                "HTTP {status}: {body}"
            )));
        }

        let body = resp.text().await?;
        let trimmed = body.trim();
        debug!(bytes = trimmed.len(), "transcription response received");

        // Some providers return JSON {"text": "..."}, others plain text.
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(text) = json.get("text").and_then(|v| v.as_str()) {
                return Ok(text.to_string());
            }
        }

        Ok(trimmed.to_string())
    }
}
