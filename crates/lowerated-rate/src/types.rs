use std::collections::BTreeMap;

use lowerated_core::{AppConfig, FailurePolicy};
use serde::Serialize;

use crate::error::{FailureKind, RateError};

/// Attribute name → sentiment score.
pub type ScoreMap = BTreeMap<String, f64>;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CHUNK_SIZE: usize = 4000;

/// Tuning knobs for one aggregation run.
#[derive(Debug, Clone)]
pub struct RateConfig {
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    /// Response token cap per completion.
    pub max_tokens: u32,
    pub temperature: f32,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    pub request_timeout_secs: u64,
    /// Chunk requests in flight at once. `1` keeps the run strictly sequential.
    pub max_concurrent_requests: usize,
    /// Extra attempts per chunk on transient transport errors.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            request_timeout_secs: 60,
            max_concurrent_requests: 1,
            max_retries: 0,
            retry_backoff_base_ms: 1_000,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl RateConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.completion_base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            chunk_size: config.chunk_size,
            request_timeout_secs: config.request_timeout_secs,
            max_concurrent_requests: config.max_concurrent_requests,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
            failure_policy: config.failure_policy,
        }
    }

    /// Reject settings the aggregator cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::InvalidConfig`] for a zero chunk size, zero
    /// concurrency, a zero request timeout, or a blank model identifier.
    pub fn validate(&self) -> Result<(), RateError> {
        if self.chunk_size == 0 {
            return Err(RateError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(RateError::InvalidConfig(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(RateError::InvalidConfig(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(RateError::InvalidConfig(
                "model must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of scoring a single chunk.
#[derive(Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    /// On success, the requested attributes the service returned a value for.
    pub result: Result<ScoreMap, RateError>,
}

/// A chunk that was left out of the average.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkFailure {
    pub index: usize,
    pub kind: FailureKind,
    pub reason: String,
}

/// Aggregated attribute scores for one call.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    /// One entry per requested attribute.
    pub scores: ScoreMap,
    /// Number of chunks the review text was split into.
    pub chunk_count: usize,
    /// Chunks skipped under [`FailurePolicy::SkipFailed`]. Always empty under `Abort`.
    pub failed_chunks: Vec<ChunkFailure>,
    pub failure_policy: FailurePolicy,
}

impl AggregateReport {
    #[must_use]
    pub fn succeeded_chunks(&self) -> usize {
        self.chunk_count - self.failed_chunks.len()
    }

    /// `true` when every chunk contributed to the scores.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty()
    }

    #[must_use]
    pub fn into_scores(self) -> ScoreMap {
        self.scores
    }
}
