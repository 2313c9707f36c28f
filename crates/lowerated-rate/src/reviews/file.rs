use std::path::Path;

use crate::error::RateError;

use super::{parse_reviews, ReviewFormat};

fn format_of(path: &Path) -> Result<ReviewFormat, RateError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ReviewFormat::from_file_name(&name)
}

fn io_error(path: &Path, source: std::io::Error) -> RateError {
    RateError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Read reviews from a local `.csv` or `.txt` file.
///
/// # Errors
///
/// Returns [`RateError::UnsupportedFormat`] for any other extension,
/// [`RateError::Io`] if the file cannot be read, or [`RateError::Csv`] if a
/// CSV record is malformed.
pub fn read_reviews_file(path: &Path) -> Result<Vec<String>, RateError> {
    let format = format_of(path)?;
    let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;

    let reviews = parse_reviews(&bytes, format)?;
    tracing::debug!(path = %path.display(), count = reviews.len(), "read reviews from file");
    Ok(reviews)
}

/// Async counterpart of [`read_reviews_file`] for use on the runtime.
///
/// # Errors
///
/// Same as [`read_reviews_file`].
pub async fn load_reviews_file(path: &Path) -> Result<Vec<String>, RateError> {
    let format = format_of(path)?;
    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;

    let reviews = parse_reviews(&bytes, format)?;
    tracing::debug!(path = %path.display(), count = reviews.len(), "loaded reviews from file");
    Ok(reviews)
}
