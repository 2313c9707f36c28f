mod rate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::rate::RateArgs;

#[derive(Debug, Parser)]
#[command(name = "lowerated")]
#[command(about = "Score reviews per attribute with a text-completion model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the entities in the attribute catalog
    Entities,
    /// List the default attributes for an entity
    Attributes {
        /// Entity name as it appears in the catalog
        entity: String,
    },
    /// Score reviews for an entity and print attribute scores as JSON
    Rate(RateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = lowerated_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Entities => {
            let catalog = lowerated_core::load_catalog(&config.catalog_path)?;
            for entity in catalog.entities() {
                println!("{entity}");
            }
        }
        Commands::Attributes { entity } => {
            let catalog = lowerated_core::load_catalog(&config.catalog_path)?;
            let attributes = catalog
                .attributes(&entity)
                .ok_or_else(|| anyhow::anyhow!("entity '{entity}' is not in the catalog"))?;
            for attribute in attributes {
                println!("{attribute}");
            }
        }
        Commands::Rate(args) => rate::run_rate(&config, args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
