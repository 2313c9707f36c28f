//! Attribute-level review sentiment via a text-completion model.
//!
//! Joins a review corpus into one blob, splits it into bounded chunks, asks an
//! OpenAI-compatible completion endpoint to score each chunk per attribute in
//! `[-1, 1]`, and averages the scores across chunks.

pub mod aggregator;
pub mod chunker;
pub mod completion;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod reviews;
pub mod types;

mod parse;
mod retry;

pub use aggregator::Aggregator;
pub use completion::{CompletionRequest, CompletionService, OpenAiClient};
pub use error::{FailureKind, RateError};
pub use lowerated_core::FailurePolicy;
pub use pipeline::{rate_reviews, score_attributes};
pub use reviews::{download_reviews, load_reviews_file, read_reviews_file, ReviewSource};
pub use types::{AggregateReport, ChunkFailure, ChunkOutcome, RateConfig, ScoreMap};
