//! Completion-service boundary and the OpenAI-compatible HTTP client.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::RateError;
use crate::retry::Backoff;
use crate::types::RateConfig;

const USER_AGENT: &str = "lowerated/0.1 (review-sentiment)";

/// One text-completion call: a system instruction plus a user prompt.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    /// Number of completions to sample. The aggregator always asks for one.
    pub n: u32,
    pub temperature: f32,
}

/// A synchronous request/response text-completion endpoint.
///
/// Implementations return the generated text verbatim; interpreting it is
/// the aggregator's job.
pub trait CompletionService {
    fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> impl Future<Output = Result<String, RateError>> + Send;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    n: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Holds the credential for its own lifetime only; callers build one per
/// aggregation run.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    backoff: Backoff,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a client using the endpoint, timeout and retry policy in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::MissingCredential`] if `api_key` is blank. This
    /// check runs before anything touches the network. Returns
    /// [`RateError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, config: &RateConfig) -> Result<Self, RateError> {
        if api_key.trim().is_empty() {
            return Err(RateError::MissingCredential);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            backoff: Backoff {
                max_retries: config.max_retries,
                base_ms: config.retry_backoff_base_ms,
            },
        })
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<String, RateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RateError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| RateError::Format {
            reason: format!("completion envelope did not parse: {e}"),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(RateError::EmptyCompletion)
    }
}

impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, RateError> {
        let body = ChatRequest {
            model: request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            n: request.n,
            temperature: request.temperature,
        };

        self.backoff.run(|| self.send_once(&body)).await
    }
}
