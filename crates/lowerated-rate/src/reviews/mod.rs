//! Review sources: inline text, local files, and downloadable files.
//!
//! Every source yields a flat `Vec<String>`, one review per entry. CSV files
//! contribute their first column (header row skipped); text files contribute
//! one review per non-blank line.

mod download;
mod file;

use std::path::PathBuf;

use reqwest::Client;

use crate::error::RateError;

pub use download::download_reviews;
pub use file::{load_reviews_file, read_reviews_file};

/// Where a batch of reviews comes from.
#[derive(Debug, Clone)]
pub enum ReviewSource {
    Inline(Vec<String>),
    File(PathBuf),
    Url(String),
}

impl ReviewSource {
    /// Load the reviews. `client` is only used for [`ReviewSource::Url`].
    ///
    /// # Errors
    ///
    /// Propagates errors from [`load_reviews_file`] and [`download_reviews`].
    pub async fn load(&self, client: &Client) -> Result<Vec<String>, RateError> {
        match self {
            ReviewSource::Inline(reviews) => Ok(reviews.clone()),
            ReviewSource::File(path) => load_reviews_file(path).await,
            ReviewSource::Url(url) => download_reviews(client, url).await,
        }
    }
}

/// File formats the loaders can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReviewFormat {
    Csv,
    Text,
}

impl ReviewFormat {
    /// Pick a format from a file name's extension (case-insensitive).
    pub(crate) fn from_file_name(name: &str) -> Result<Self, RateError> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(ReviewFormat::Csv),
            "txt" => Ok(ReviewFormat::Text),
            "xlsx" => Err(RateError::UnsupportedFormat(format!(
                "{name} (spreadsheets are not supported; export the sheet as CSV)"
            ))),
            _ => Err(RateError::UnsupportedFormat(name.to_owned())),
        }
    }
}

/// Parse raw file bytes into reviews.
pub(crate) fn parse_reviews(bytes: &[u8], format: ReviewFormat) -> Result<Vec<String>, RateError> {
    match format {
        ReviewFormat::Csv => parse_csv(bytes),
        ReviewFormat::Text => Ok(parse_text(&String::from_utf8_lossy(bytes))),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<String>, RateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut reviews = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(review) = record.get(0).map(str::trim).filter(|r| !r.is_empty()) {
            reviews.push(review.to_owned());
        }
    }
    Ok(reviews)
}

fn parse_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
