use lowerated_core::EntityCatalog;
use lowerated_rate::ReviewSource;

use super::*;
use crate::rate::resolve_attributes;

fn catalog() -> anyhow::Result<EntityCatalog> {
    Ok(EntityCatalog::from_json_str(
        r#"{"Hotel": ["cleanliness", "staff"]}"#,
    )?)
}

fn rate_args(cli: Cli) -> RateArgs {
    match cli.command {
        Commands::Rate(args) => args,
        other => panic!("expected rate command, got {other:?}"),
    }
}

#[test]
fn parses_entities_command() {
    let cli = Cli::try_parse_from(["lowerated", "entities"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Entities));
}

#[test]
fn parses_attributes_command() {
    let cli = Cli::try_parse_from(["lowerated", "attributes", "Hotel"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Attributes { ref entity } if entity == "Hotel"));
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["lowerated"]).is_err());
}

#[test]
fn rate_splits_attribute_list() {
    let cli = Cli::try_parse_from([
        "lowerated",
        "rate",
        "--entity",
        "Acme Lens",
        "--attributes",
        "clarity,price",
        "--review",
        "Sharp.",
    ])
    .unwrap();
    let args = rate_args(cli);
    assert_eq!(args.entity, "Acme Lens");
    assert_eq!(args.attributes, vec!["clarity", "price"]);
    assert!(!args.report);
}

#[test]
fn rate_collects_repeated_reviews_inline() {
    let cli = Cli::try_parse_from([
        "lowerated", "rate", "--entity", "X", "--review", "one", "--review", "two",
    ])
    .unwrap();
    let source = rate_args(cli).review_source();
    assert!(matches!(source, ReviewSource::Inline(ref r) if r == &["one", "two"]));
}

#[test]
fn rate_file_source() {
    let cli = Cli::try_parse_from(["lowerated", "rate", "--entity", "X", "--file", "r.csv"])
        .unwrap();
    let source = rate_args(cli).review_source();
    assert!(matches!(source, ReviewSource::File(ref p) if p.to_str() == Some("r.csv")));
}

#[test]
fn rate_url_source() {
    let cli = Cli::try_parse_from([
        "lowerated",
        "rate",
        "--entity",
        "X",
        "--url",
        "https://example.com/r.txt",
        "--report",
    ])
    .unwrap();
    let args = rate_args(cli);
    assert!(args.report);
    assert!(matches!(
        args.review_source(),
        ReviewSource::Url(ref u) if u == "https://example.com/r.txt"
    ));
}

#[test]
fn rate_rejects_file_and_url_together() {
    let result = Cli::try_parse_from([
        "lowerated",
        "rate",
        "--entity",
        "X",
        "--file",
        "r.csv",
        "--url",
        "https://example.com/r.txt",
    ]);
    assert!(result.is_err());
}

#[test]
fn explicit_attributes_skip_the_catalog() {
    let attrs = resolve_attributes(&["price".to_owned(), " ".to_owned()], "Hotel", || {
        panic!("catalog must not be loaded when attributes are given")
    })
    .unwrap();
    assert_eq!(attrs, vec!["price"]);
}

#[test]
fn attributes_default_to_catalog_entry() {
    let attrs = resolve_attributes(&[], "Hotel", catalog).unwrap();
    assert_eq!(attrs, vec!["cleanliness", "staff"]);
}

#[test]
fn unknown_entity_without_attributes_fails() {
    let err = resolve_attributes(&[], "Spaceship", catalog).unwrap_err();
    assert!(err.to_string().contains("Spaceship"));
}
