//! Static entity → attribute catalog.
//!
//! The catalog is a JSON object mapping each entity name to the attribute
//! names worth scoring for it. It is loaded once and never mutated.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::ConfigError;

/// Read-only lookup from entity name to its default attribute list.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entries: BTreeMap<String, Vec<String>>,
}

impl EntityCatalog {
    /// Parse and validate a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CatalogParse`] if the document is not a JSON
    /// object of string arrays, or [`ConfigError::Validation`] if an entity
    /// name or attribute is blank or an entity lists the same attribute twice.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let entries: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        validate_entries(&entries)?;
        Ok(Self { entries })
    }

    /// All entity names, sorted.
    #[must_use]
    pub fn entities(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Attributes for `entity`, or `None` if the catalog does not know it.
    #[must_use]
    pub fn attributes(&self, entity: &str) -> Option<&[String]> {
        self.entries.get(entity).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load and validate the catalog from a JSON file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<EntityCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogIo {
        path: path.display().to_string(),
        source: e,
    })?;
    EntityCatalog::from_json_str(&content)
}

fn validate_entries(entries: &BTreeMap<String, Vec<String>>) -> Result<(), ConfigError> {
    for (entity, attributes) in entries {
        if entity.trim().is_empty() {
            return Err(ConfigError::Validation(
                "entity name must be non-empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for attribute in attributes {
            if attribute.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "entity '{entity}' has a blank attribute name"
                )));
            }
            if !seen.insert(attribute.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "entity '{entity}' lists attribute '{attribute}' more than once"
                )));
            }
        }
    }

    Ok(())
}
