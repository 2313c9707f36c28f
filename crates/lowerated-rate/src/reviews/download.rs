use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Url};

use crate::error::RateError;

use super::{parse_reviews, ReviewFormat};

/// Download a `.csv` or `.txt` file of reviews and parse it.
///
/// The format is taken from the `Content-Disposition` filename when the
/// server sends one, otherwise from the last segment of the URL path.
///
/// # Errors
///
/// - [`RateError::Http`] on network failure or a non-2xx status.
/// - [`RateError::UnsupportedFormat`] if the filename has another extension.
/// - [`RateError::Csv`] if a CSV record is malformed.
pub async fn download_reviews(client: &Client, url: &str) -> Result<Vec<String>, RateError> {
    let response = client.get(url).send().await?.error_for_status()?;

    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| filename_from_url(url));
    let format = ReviewFormat::from_file_name(&filename)?;

    let bytes = response.bytes().await?;
    let reviews = parse_reviews(&bytes, format)?;
    tracing::debug!(url, filename = %filename, count = reviews.len(), "downloaded reviews");
    Ok(reviews)
}

/// Extract the `filename=` parameter from a `Content-Disposition` header value.
fn filename_from_disposition(header: &str) -> Option<String> {
    let (_, rest) = header.rsplit_once("filename=")?;
    let name = rest
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"');
    (!name.is_empty()).then(|| name.to_owned())
}

/// Last non-empty path segment of `url`, ignoring any query string.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(last) = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        {
            return last.to_owned();
        }
    }
    url.rsplit('/').next().unwrap_or_default().to_owned()
}
