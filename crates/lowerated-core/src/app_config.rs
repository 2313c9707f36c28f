use std::path::PathBuf;

use serde::Serialize;

/// What the aggregator does when a single chunk request fails.
///
/// Serializes to the same names `LOWERATED_FAILURE_POLICY` accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failed chunk aborts the whole call. No partial sums survive.
    #[default]
    Abort,
    /// Failed chunks are reported and left out of the average.
    #[serde(rename = "skip")]
    SkipFailed,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::SkipFailed => write!(f, "skip"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub completion_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub chunk_size: usize,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub failure_policy: FailurePolicy,
    pub catalog_path: PathBuf,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("completion_base_url", &self.completion_base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("chunk_size", &self.chunk_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("failure_policy", &self.failure_policy)
            .field("catalog_path", &self.catalog_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}
