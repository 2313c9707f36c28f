//! Shared configuration and the entity/attribute catalog for lowerated.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod error;

pub use app_config::{AppConfig, FailurePolicy};
pub use catalog::{load_catalog, EntityCatalog};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
