//! Chunked sentiment aggregation.
//!
//! The review corpus is joined into one blob, split into bounded chunks, and
//! each chunk is scored by the completion service. Per-attribute scores are
//! averaged over the chunks that contributed.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use futures::stream::{self, StreamExt};
use lowerated_core::FailurePolicy;
use tracing::Instrument;

use crate::chunker::{chunk_count, join_reviews, ReviewChunks};
use crate::completion::{CompletionRequest, CompletionService};
use crate::error::RateError;
use crate::parse::parse_scores;
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::types::{AggregateReport, ChunkFailure, ChunkOutcome, RateConfig, ScoreMap};

/// Running per-attribute mean over successful chunks.
///
/// Every requested attribute is present from the start at `0.0`; attributes
/// a chunk did not mention contribute `0.0` for that chunk.
#[derive(Debug)]
struct ScoreAccumulator {
    means: ScoreMap,
    samples: usize,
}

impl ScoreAccumulator {
    fn new(attributes: &BTreeSet<&str>) -> Self {
        Self {
            means: attributes.iter().map(|a| ((*a).to_owned(), 0.0)).collect(),
            samples: 0,
        }
    }

    fn add(&mut self, chunk_scores: &ScoreMap) {
        self.samples += 1;
        #[allow(clippy::cast_precision_loss)]
        let n = self.samples as f64;
        for (attribute, mean) in &mut self.means {
            let x = chunk_scores.get(attribute).copied().unwrap_or(0.0);
            // Incremental form keeps a constant signal exact: v, v, v → v.
            *mean += (x - *mean) / n;
        }
    }

    fn finish(self) -> ScoreMap {
        self.means
    }
}

/// Scores review corpora against a [`CompletionService`].
#[derive(Debug)]
pub struct Aggregator<S> {
    service: S,
    config: RateConfig,
}

impl<S: CompletionService> Aggregator<S> {
    /// # Errors
    ///
    /// Returns [`RateError::InvalidConfig`] if `config` fails validation.
    pub fn new(service: S, config: RateConfig) -> Result<Self, RateError> {
        config.validate()?;
        Ok(Self { service, config })
    }

    #[must_use]
    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    /// Average the service's per-attribute scores across all review chunks.
    ///
    /// The returned report always holds exactly the requested attribute set
    /// (duplicates collapse). Under [`FailurePolicy::Abort`] the first failed
    /// chunk ends the run with its error and no partial scores; under
    /// [`FailurePolicy::SkipFailed`] failed chunks are listed in the report
    /// and left out of the mean.
    ///
    /// # Errors
    ///
    /// Under `Abort`, returns the first chunk error in chunk order
    /// (transport or format).
    pub async fn aggregate<R, A>(
        &self,
        reviews: &[R],
        entity: &str,
        attributes: &[A],
    ) -> Result<AggregateReport, RateError>
    where
        R: AsRef<str>,
        A: AsRef<str>,
    {
        let chunk_size = NonZeroUsize::new(self.config.chunk_size).ok_or_else(|| {
            RateError::InvalidConfig("chunk_size must be at least 1".to_string())
        })?;

        let mut wanted: BTreeSet<&str> = BTreeSet::new();
        let attribute_list: Vec<&str> = attributes
            .iter()
            .map(AsRef::as_ref)
            .filter(|a| wanted.insert(*a))
            .collect();

        let text = join_reviews(reviews);
        let total_chunks = chunk_count(&text, chunk_size);
        let mut accumulator = ScoreAccumulator::new(&wanted);

        if attribute_list.is_empty() {
            tracing::debug!(entity, "no attributes requested, skipping completion calls");
            return Ok(AggregateReport {
                scores: accumulator.finish(),
                chunk_count: total_chunks,
                failed_chunks: Vec::new(),
                failure_policy: self.config.failure_policy,
            });
        }

        tracing::debug!(
            entity,
            reviews = reviews.len(),
            attributes = attribute_list.len(),
            chunks = total_chunks,
            "scoring review chunks"
        );

        let mut outcomes = stream::iter(ReviewChunks::new(&text, chunk_size).enumerate())
            .map(|(index, chunk)| self.score_chunk(index, chunk, entity, &attribute_list, &wanted))
            .buffered(self.config.max_concurrent_requests);

        let mut failed_chunks = Vec::new();
        while let Some(outcome) = outcomes.next().await {
            match outcome.result {
                Ok(chunk_scores) => accumulator.add(&chunk_scores),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        tracing::warn!(
                            entity,
                            chunk = outcome.index,
                            kind = %err.kind(),
                            error = %err,
                            "chunk failed, aborting aggregation"
                        );
                        return Err(err);
                    }
                    FailurePolicy::SkipFailed => {
                        tracing::warn!(
                            entity,
                            chunk = outcome.index,
                            kind = %err.kind(),
                            error = %err,
                            "chunk failed, leaving it out of the average"
                        );
                        failed_chunks.push(ChunkFailure {
                            index: outcome.index,
                            kind: err.kind(),
                            reason: err.to_string(),
                        });
                    }
                },
            }
        }

        tracing::info!(
            entity,
            chunks = total_chunks,
            failed = failed_chunks.len(),
            "aggregated attribute scores"
        );

        Ok(AggregateReport {
            scores: accumulator.finish(),
            chunk_count: total_chunks,
            failed_chunks,
            failure_policy: self.config.failure_policy,
        })
    }

    /// Like [`Aggregator::aggregate`] but collapses any failure into an empty map.
    ///
    /// The failure is logged at `error` level. No partial scores are returned
    /// when the run aborts.
    pub async fn aggregate_or_empty<R, A>(
        &self,
        reviews: &[R],
        entity: &str,
        attributes: &[A],
    ) -> ScoreMap
    where
        R: AsRef<str>,
        A: AsRef<str>,
    {
        match self.aggregate(reviews, entity, attributes).await {
            Ok(report) => report.into_scores(),
            Err(err) => {
                tracing::error!(
                    entity,
                    kind = %err.kind(),
                    error = %err,
                    "attribute scoring failed, returning empty scores"
                );
                ScoreMap::new()
            }
        }
    }

    async fn score_chunk(
        &self,
        index: usize,
        chunk: &str,
        entity: &str,
        attributes: &[&str],
        wanted: &BTreeSet<&str>,
    ) -> ChunkOutcome {
        // Only an empty corpus produces an empty chunk; it carries no signal.
        if chunk.is_empty() {
            return ChunkOutcome {
                index,
                result: Ok(ScoreMap::new()),
            };
        }

        let prompt = build_prompt(entity, attributes, chunk);
        let request = CompletionRequest {
            model: &self.config.model,
            system: SYSTEM_PROMPT,
            prompt: &prompt,
            max_tokens: self.config.max_tokens,
            n: 1,
            temperature: self.config.temperature,
        };

        tracing::debug!(chunk = index, chars = chunk.chars().count(), "requesting chunk scores");
        let result = self
            .service
            .complete(&request)
            .instrument(tracing::debug_span!("chunk", index))
            .await
            .and_then(|text| parse_scores(&text, wanted));

        ChunkOutcome { index, result }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in call order.
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, RateError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, RateError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_owned)).collect()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CompletionService for Scripted {
        async fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .expect("reply queue poisoned")
                .pop_front()
                .unwrap_or_else(|| Ok("{}".to_owned()))
        }
    }

    fn config(chunk_size: usize, policy: FailurePolicy) -> RateConfig {
        RateConfig {
            chunk_size,
            failure_policy: policy,
            ..RateConfig::default()
        }
    }

    fn format_error() -> RateError {
        RateError::Format {
            reason: "not json".to_owned(),
        }
    }

    #[test]
    fn accumulator_starts_at_zero_for_every_attribute() {
        let wanted: BTreeSet<&str> = ["a", "b"].into_iter().collect();
        let scores = ScoreAccumulator::new(&wanted).finish();
        assert_eq!(scores.len(), 2);
        assert!(scores.values().all(|v| *v == 0.0));
    }

    #[test]
    fn accumulator_keeps_constant_signal_exact() {
        let wanted: BTreeSet<&str> = ["a"].into_iter().collect();
        let mut acc = ScoreAccumulator::new(&wanted);
        let chunk: ScoreMap = [("a".to_owned(), 0.1)].into_iter().collect();
        for _ in 0..7 {
            acc.add(&chunk);
        }
        assert_eq!(acc.finish()["a"], 0.1);
    }

    #[tokio::test]
    async fn empty_reviews_yield_zero_scores_without_calls() {
        let service = Scripted::new(vec![]);
        let aggregator = Aggregator::new(service, RateConfig::default()).unwrap();
        let reviews: Vec<String> = Vec::new();
        let report = aggregator
            .aggregate(&reviews, "Lens", &["clarity", "price"])
            .await
            .unwrap();
        assert_eq!(report.chunk_count, 1);
        assert_eq!(report.scores.len(), 2);
        assert!(report.scores.values().all(|v| *v == 0.0));
        assert_eq!(aggregator.service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_attributes_collapse() {
        let service = Scripted::new(vec![Ok(r#"{"price": 0.4}"#)]);
        let aggregator = Aggregator::new(service, RateConfig::default()).unwrap();
        let report = aggregator
            .aggregate(&["cheap"], "Lens", &["price", "price"])
            .await
            .unwrap();
        assert_eq!(report.scores.len(), 1);
        assert_eq!(report.scores["price"], 0.4);
    }

    #[tokio::test]
    async fn no_attributes_makes_no_calls() {
        let service = Scripted::new(vec![]);
        let aggregator = Aggregator::new(service, RateConfig::default()).unwrap();
        let attributes: [&str; 0] = [];
        let report = aggregator
            .aggregate(&["some review"], "Lens", &attributes)
            .await
            .unwrap();
        assert!(report.scores.is_empty());
        assert_eq!(aggregator.service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn abort_stops_at_first_failure() {
        let service = Scripted::new(vec![
            Ok(r#"{"price": 1.0}"#),
            Err(format_error()),
            Ok(r#"{"price": 1.0}"#),
        ]);
        let aggregator = Aggregator::new(service, config(2, FailurePolicy::Abort)).unwrap();
        let err = aggregator
            .aggregate(&["abcdef"], "Lens", &["price"])
            .await
            .unwrap_err();
        assert!(matches!(err, RateError::Format { .. }));
        assert_eq!(aggregator.service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn aggregate_or_empty_collapses_failures() {
        let service = Scripted::new(vec![Ok(r#"{"price": 1.0}"#), Err(format_error())]);
        let aggregator = Aggregator::new(service, config(2, FailurePolicy::Abort)).unwrap();
        let scores = aggregator
            .aggregate_or_empty(&["abcd"], "Lens", &["price"])
            .await;
        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn skip_failed_averages_successful_chunks() {
        let service = Scripted::new(vec![
            Ok(r#"{"price": 1.0}"#),
            Err(format_error()),
            Ok(r#"{"price": 0.0}"#),
        ]);
        let aggregator = Aggregator::new(service, config(2, FailurePolicy::SkipFailed)).unwrap();
        let report = aggregator
            .aggregate(&["abcdef"], "Lens", &["price"])
            .await
            .unwrap();
        assert_eq!(report.chunk_count, 3);
        assert_eq!(report.failure_policy, FailurePolicy::SkipFailed);
        assert_eq!(report.succeeded_chunks(), 2);
        assert_eq!(report.failed_chunks.len(), 1);
        assert_eq!(report.failed_chunks[0].index, 1);
        assert_eq!(report.scores["price"], 0.5);
    }

    #[tokio::test]
    async fn skip_failed_with_all_chunks_failing_is_all_zero() {
        let service = Scripted::new(vec![Err(format_error()), Err(format_error())]);
        let aggregator = Aggregator::new(service, config(2, FailurePolicy::SkipFailed)).unwrap();
        let report = aggregator
            .aggregate(&["abcd"], "Lens", &["price"])
            .await
            .unwrap();
        assert_eq!(report.succeeded_chunks(), 0);
        assert_eq!(report.scores["price"], 0.0);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = Aggregator::new(Scripted::new(vec![]), config(0, FailurePolicy::Abort));
        assert!(matches!(result, Err(RateError::InvalidConfig(_))));
    }
}
