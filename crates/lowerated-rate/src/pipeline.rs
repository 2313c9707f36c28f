//! Entry points that pair the aggregator with a per-call OpenAI client.

use crate::aggregator::Aggregator;
use crate::completion::OpenAiClient;
use crate::error::RateError;
use crate::types::{AggregateReport, RateConfig, ScoreMap};

/// Validate settings and build a client scoped to one call.
///
/// Runs before any network I/O, so a missing credential never produces a request.
fn build_aggregator(
    api_key: Option<&str>,
    config: &RateConfig,
) -> Result<Aggregator<OpenAiClient>, RateError> {
    config.validate()?;
    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(RateError::MissingCredential)?;
    let client = OpenAiClient::new(api_key, config)?;
    Aggregator::new(client, config.clone())
}

/// Score `reviews` of `entity` on each of `attributes` and return the full report.
///
/// # Errors
///
/// - [`RateError::MissingCredential`] / [`RateError::InvalidConfig`] before any request.
/// - Under the abort policy, the first chunk failure (see [`RateError::kind`]).
pub async fn rate_reviews<R, A>(
    reviews: &[R],
    entity: &str,
    attributes: &[A],
    api_key: Option<&str>,
    config: &RateConfig,
) -> Result<AggregateReport, RateError>
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    build_aggregator(api_key, config)?
        .aggregate(reviews, entity, attributes)
        .await
}

/// Score `reviews` and return attribute → averaged score.
///
/// Configuration problems are returned as errors. Any failure after that
/// point is logged and yields an empty map.
///
/// # Errors
///
/// Returns [`RateError::MissingCredential`] if `api_key` is absent or blank,
/// or [`RateError::InvalidConfig`] if `config` fails validation.
pub async fn score_attributes<R, A>(
    reviews: &[R],
    entity: &str,
    attributes: &[A],
    api_key: Option<&str>,
    config: &RateConfig,
) -> Result<ScoreMap, RateError>
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    let aggregator = build_aggregator(api_key, config)?;
    Ok(aggregator
        .aggregate_or_empty(reviews, entity, attributes)
        .await)
}
