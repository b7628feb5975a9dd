//! Gemini generative-language client
//!
//! Talks to the `generateContent` endpoint:
//!
//! ```text
//! POST {base_url}/v1beta/models/{model}:generateContent?key={api_key}
//! {"contents":[{"parts":[{"text":"..."}]}],"generationConfig":{...}}
//! ```
//!
//! and reads `candidates[0].content.parts[0].text` from the reply.

use crate::llm::client::{LLMClient, compose_prompt};
use crate::llm::retry::{RetryExecutor, is_retryable_status};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{GeminiConfig, GenerationConfig, RetryConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

// ============= Wire Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    /// Single-turn request with one text part
    pub fn single_text(text: String, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: Some(text) }],
            }],
            generation_config,
        }
    }
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(self) -> Result<String> {
        self.candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| AppError::EmptyResult("No response from Gemini".to_string()))
    }
}

// ============= Client =============

/// One failed attempt, tagged with whether a retry could help.
struct AttemptFailure {
    error: AppError,
    retryable: bool,
}

/// Gemini client bound to one credential and one configuration snapshot.
///
/// The underlying `reqwest::Client` is a shared connection pool; building a
/// `GeminiClient` per request is cheap.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    generation: GenerationConfig,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String, config: &GeminiConfig) -> Self {
        Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            generation: config.generation.clone(),
            retry: config.retry.clone(),
        }
    }

    /// Shared HTTP client for all upstream calls
    pub fn http_client(config: &GeminiConfig) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("udx3-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Unexpected(format!("Failed to build HTTP client: {}", e)))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send `text` upstream, retrying transient failures per the retry policy
    async fn generate_text(&self, text: String) -> Result<String> {
        let request = GenerateContentRequest::single_text(text, self.generation.clone());

        let outcome = RetryExecutor::execute(
            &self.retry,
            |attempt| self.send_once(&request, attempt),
            |res: &std::result::Result<String, AttemptFailure>| {
                matches!(res, Err(failure) if failure.retryable)
            },
        )
        .await;

        outcome.map_err(|failure| failure.error)
    }

    async fn send_once(
        &self,
        request: &GenerateContentRequest,
        attempt: u32,
    ) -> std::result::Result<String, AttemptFailure> {
        debug!(model = %self.model, attempt, "Sending Gemini generateContent request");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let retryable = e.is_timeout() || e.is_connect();
                // The URL carries the API key; keep it out of messages
                let e = e.without_url();
                warn!(attempt, "Gemini request failed: {}", e);
                AttemptFailure {
                    error: AppError::Unexpected(format!("Gemini request failed: {}", e)),
                    retryable,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                attempt,
                "Gemini API error: {}",
                error_text
            );
            return Err(AttemptFailure {
                error: AppError::Upstream {
                    status: Some(status.as_u16()),
                    message: format!("Gemini API error: {}", status),
                },
                retryable: is_retryable_status(status),
            });
        }

        let data: GenerateContentResponse = response.json().await.map_err(|e| AttemptFailure {
            error: AppError::Unexpected(format!(
                "Failed to parse Gemini response: {}",
                e.without_url()
            )),
            retryable: false,
        })?;

        data.first_text().map_err(|error| AttemptFailure {
            error,
            retryable: false,
        })
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_text(prompt.to_string()).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_text(compose_prompt(system, prompt)).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
