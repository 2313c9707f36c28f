//! Integration tests for remote review downloads.

use lowerated_rate::{download_reviews, FailureKind, RateError};
use reqwest::Client;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn csv_picked_from_url_extension() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exports/reviews.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("review\nSharp.\nToo pricey.\n"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/exports/reviews.csv", server.uri());
    let reviews = download_reviews(&Client::new(), &url).await.unwrap();
    assert_eq!(reviews, vec!["Sharp.", "Too pricey."]);
}

#[tokio::test]
async fn content_disposition_overrides_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", r#"attachment; filename="reviews.txt""#)
                .set_body_string("first\n\nsecond\n"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/download", server.uri());
    let reviews = download_reviews(&Client::new(), &url).await.unwrap();
    assert_eq!(reviews, vec!["first", "second"]);
}

#[tokio::test]
async fn unknown_extension_is_input_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let url = format!("{}/reviews.json", server.uri());
    let err = download_reviews(&Client::new(), &url).await.unwrap_err();
    assert!(matches!(err, RateError::UnsupportedFormat(_)));
    assert_eq!(err.kind(), FailureKind::Input);
}

#[tokio::test]
async fn not_found_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/reviews.csv", server.uri());
    let err = download_reviews(&Client::new(), &url).await.unwrap_err();
    assert!(matches!(err, RateError::Http(_)), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Transport);
}
