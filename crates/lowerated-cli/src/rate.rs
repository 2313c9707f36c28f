//! `rate` command: load reviews, resolve attributes, print scores.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use lowerated_core::{AppConfig, EntityCatalog};
use lowerated_rate::{RateConfig, ReviewSource};

#[derive(Debug, Args)]
pub(crate) struct RateArgs {
    /// Entity the reviews are about
    #[arg(long)]
    pub(crate) entity: String,

    /// Comma-separated attributes to score; defaults to the catalog entry for the entity
    #[arg(long, value_delimiter = ',')]
    pub(crate) attributes: Vec<String>,

    /// Read reviews from a local .csv (first column) or .txt (one per line) file
    #[arg(long, conflicts_with_all = ["url", "reviews"])]
    pub(crate) file: Option<PathBuf>,

    /// Download reviews from a .csv or .txt URL
    #[arg(long, conflicts_with = "reviews")]
    pub(crate) url: Option<String>,

    /// Inline review text; repeat for several reviews
    #[arg(long = "review")]
    pub(crate) reviews: Vec<String>,

    /// Print the full report (chunk counts, failed chunks) and fail on errors
    #[arg(long)]
    pub(crate) report: bool,
}

impl RateArgs {
    pub(crate) fn review_source(&self) -> ReviewSource {
        if let Some(path) = &self.file {
            ReviewSource::File(path.clone())
        } else if let Some(url) = &self.url {
            ReviewSource::Url(url.clone())
        } else {
            ReviewSource::Inline(self.reviews.clone())
        }
    }
}

/// Attributes given on the command line, or the catalog's list for `entity`.
pub(crate) fn resolve_attributes(
    requested: &[String],
    entity: &str,
    catalog: impl FnOnce() -> anyhow::Result<EntityCatalog>,
) -> anyhow::Result<Vec<String>> {
    let requested: Vec<String> = requested
        .iter()
        .map(|a| a.trim().to_owned())
        .filter(|a| !a.is_empty())
        .collect();
    if !requested.is_empty() {
        return Ok(requested);
    }

    let catalog = catalog()?;
    catalog
        .attributes(entity)
        .map(<[String]>::to_vec)
        .ok_or_else(|| {
            anyhow::anyhow!("no --attributes given and entity '{entity}' is not in the catalog")
        })
}

pub(crate) async fn run_rate(config: &AppConfig, args: RateArgs) -> anyhow::Result<()> {
    let attributes = resolve_attributes(&args.attributes, &args.entity, || {
        lowerated_core::load_catalog(&config.catalog_path).map_err(anyhow::Error::from)
    })?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("failed to build HTTP client")?;
    let reviews = args
        .review_source()
        .load(&http)
        .await
        .context("failed to load reviews")?;

    tracing::info!(
        entity = %args.entity,
        reviews = reviews.len(),
        attributes = attributes.len(),
        "rating reviews"
    );

    let rate_config = RateConfig::from_app_config(config);
    let api_key = config.openai_api_key.as_deref();

    let output = if args.report {
        let report = lowerated_rate::rate_reviews(
            &reviews,
            &args.entity,
            &attributes,
            api_key,
            &rate_config,
        )
        .await?;
        serde_json::to_string_pretty(&report)?
    } else {
        let scores = lowerated_rate::score_attributes(
            &reviews,
            &args.entity,
            &attributes,
            api_key,
            &rate_config,
        )
        .await?;
        serde_json::to_string_pretty(&scores)?
    };

    println!("{output}");
    Ok(())
}
