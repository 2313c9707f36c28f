use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`RateError`].
///
/// Lets callers tell "service down" apart from "bad response shape" without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing credential or invalid settings. Raised before any network I/O.
    Configuration,
    /// Network failure, timeout, or a non-2xx status from the completion service.
    Transport,
    /// The completion text is not a JSON object of attribute → number.
    Format,
    /// A review source could not be read or has an unsupported format.
    Input,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Configuration => write!(f, "configuration"),
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Format => write!(f, "format"),
            FailureKind::Input => write!(f, "input"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("completion API key is required")]
    MissingCredential,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion service returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("completion service returned no message content")]
    EmptyCompletion,

    #[error("malformed completion response: {reason}")]
    Format { reason: String },

    #[error("unsupported review file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read reviews from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RateError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            RateError::MissingCredential | RateError::InvalidConfig(_) => {
                FailureKind::Configuration
            }
            RateError::Http(_) | RateError::UnexpectedStatus { .. } => FailureKind::Transport,
            RateError::EmptyCompletion | RateError::Format { .. } => FailureKind::Format,
            RateError::UnsupportedFormat(_) | RateError::Io { .. } | RateError::Csv(_) => {
                FailureKind::Input
            }
        }
    }
}
