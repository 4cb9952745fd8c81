//! Completion provider trait and OpenAI implementation.
//!
//! The engine talks to the LLM through `CompletionProvider`, which keeps
//! the network client swappable (and mockable in tests). `OpenAiProvider`
//! targets the Chat Completions API of any OpenAI-compatible endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{CompletionError, Result};
use crate::transcript::Message;

/// The default OpenAI API endpoint URL.
const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Default request timeout for completion calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Options for a completion request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Temperature for sampling
    pub temperature: f32,
}

/// Response from a completion request.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text of the first choice
    pub content: String,
    /// Token usage reported by the endpoint, if any
    pub usage: Option<Usage>,
}

/// Token usage reported by the completion endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the chronological message list and return the generated reply.
    ///
    /// Network, timeout, and API failures surface as `Completion` errors
    /// with a structured classification; the engine never retries.
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        options: CompletionOptions,
    ) -> Result<CompletionResponse>;
}

// ============================================================================
// OpenAI wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    r#type: String,
}

// ============================================================================
// OpenAI provider
// ============================================================================

/// Completion provider for OpenAI's Chat Completions API.
pub struct OpenAiProvider {
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenAiProvider {
    /// Create a provider against the default OpenAI endpoint.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_API_URL)
    }

    /// Create a provider with a custom base URL (Azure, proxies, local
    /// models). A trailing slash is removed.
    ///
    /// Fails with an `Http` error when the TLS backend cannot be
    /// initialized; every client built here carries the request timeout.
    pub fn with_base_url(api_key: &str, api_base: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(api_key, api_base, client))
    }

    /// Create a provider with a custom HTTP client (custom timeouts,
    /// proxies, test servers).
    pub fn with_client(api_key: &str, api_base: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        options: CompletionOptions,
    ) -> Result<CompletionResponse> {
        let request = ChatRequest {
            model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        debug!(model, message_count = messages.len(), "completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(e.to_string())
                } else {
                    CompletionError::Unknown(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            // Prefer the structured API error body when present.
            let detail = match serde_json::from_str::<ApiErrorResponse>(&error_text) {
                Ok(parsed) => format!("{} - {}", parsed.error.r#type, parsed.error.message),
                Err(_) => error_text,
            };
            return Err(CompletionError::from_status(status.as_u16(), detail).into());
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            CompletionError::Unknown(format!("failed to parse completion response: {}", e))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = chat_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });

        debug!("completion response received");
        Ok(CompletionResponse { content, usage })
    }
}
