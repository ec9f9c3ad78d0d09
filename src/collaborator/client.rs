//! OpenAI-compatible chat-completions client.
//!
//! Posts to `<api_base>/chat/completions` with bearer authentication. A
//! transient failure (connection trouble, 429, 5xx) is retried once,
//! immediately; anything else is returned to the caller as is.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{Choice, GenerationRequest, GenerationResponse, Message, Usage};
use super::TextCollaborator;
use crate::config::AssemblerConfig;
use crate::error::{CollaboratorError, ConfigError};

/// Total attempts per request: the first call plus one immediate retry.
const MAX_ATTEMPTS: u32 = 2;

/// Share of the section budget given to one HTTP attempt, so the retry still
/// fits inside the caller's timeout.
fn attempt_timeout(section_timeout: Duration) -> Duration {
    section_timeout / MAX_ATTEMPTS
}

/// Client for OpenAI-compatible chat-completions APIs.
pub struct ChatCompletionsClient {
    /// HTTP client for making API requests.
    http_client: Client,
    /// Base URL for the API.
    api_base: String,
    /// API key for bearer authentication.
    api_key: String,
    /// Model used when a request leaves it empty.
    default_model: String,
}

impl ChatCompletionsClient {
    /// Create a new client with explicit settings.
    ///
    /// # Arguments
    ///
    /// * `api_base` - Base URL (e.g., "https://api.openai.com/v1")
    /// * `api_key` - Bearer token
    /// * `default_model` - Model used when a request does not name one
    /// * `timeout` - HTTP-level timeout for a single attempt
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HttpClient` if the TLS backend cannot be set up.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_model: default_model.into(),
        })
    }

    /// Create a client from the assembler configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` when no API key is configured.
    pub fn from_config(config: &AssemblerConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ConfigError::ValidationFailed(
                "an API key is required for live generation (set OPENAI_API_KEY or use --offline)"
                    .to_string(),
            )
        })?;
        Self::new(
            &config.api_base,
            api_key,
            &config.model,
            attempt_timeout(config.timeout()),
        )
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Get the default model.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Get the API key (for debugging, returns masked value).
    pub fn api_key_masked(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            "*".repeat(chars.len())
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        }
    }

    /// Execute a request, retrying once on a transient failure.
    async fn execute_with_retry(
        &self,
        request: &ApiRequest,
    ) -> Result<GenerationResponse, CollaboratorError> {
        let url = format!("{}/chat/completions", self.api_base);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.execute_request(&url, request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        error = %err,
                        "Transient collaborator error, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Execute a single request (no retry logic).
    async fn execute_request(
        &self,
        url: &str,
        request: &ApiRequest,
    ) -> Result<GenerationResponse, CollaboratorError> {
        let http_response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = http_response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|parsed| parsed.error.message)
                .unwrap_or(error_text);

            return Err(match status_code {
                401 | 403 => CollaboratorError::Unauthorized {
                    code: status_code,
                    message,
                },
                429 => CollaboratorError::RateLimited(message),
                _ => CollaboratorError::ApiError {
                    code: status_code,
                    message,
                },
            });
        }

        let api_response: ApiResponse = http_response
            .json()
            .await
            .map_err(|e| CollaboratorError::ParseError(e.to_string()))?;

        Ok(api_response.into_generation_response())
    }
}

/// Connection, timeout and mid-request failures are retryable; anything else
/// (bad URL, TLS setup) is not.
fn classify_send_error(err: reqwest::Error) -> CollaboratorError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        CollaboratorError::Connection(err.to_string())
    } else {
        CollaboratorError::RequestFailed(err.to_string())
    }
}

#[async_trait]
impl TextCollaborator for ChatCompletionsClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, CollaboratorError> {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model
        };

        let api_request = ApiRequest {
            model,
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        self.execute_with_retry(&api_request).await
    }
}

/// Internal request structure for the chat-completions API.
#[derive(Debug, Clone, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Internal response structure from the chat-completions API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

impl ApiResponse {
    fn into_generation_response(self) -> GenerationResponse {
        let choices = self
            .choices
            .into_iter()
            .map(|choice| Choice {
                index: choice.index,
                message: Message {
                    role: choice.message.role,
                    content: choice.message.content.unwrap_or_default(),
                },
                finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            })
            .collect();

        let usage = self
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        GenerationResponse {
            id: self.id,
            model: self.model,
            choices,
            usage,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    index: u32,
    message: ApiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
