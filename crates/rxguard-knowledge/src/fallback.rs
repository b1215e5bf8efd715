//! Embedded fallback dataset.
//!
//! Compiled into the binary from `data/fallback.toml` so the engine always
//! has a knowledge base, even with no network and no configuration.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use rxguard_contracts::{
    error::{SafetyError, SafetyResult},
    knowledge::{AllergyMapping, CollectionKind, ContraindicationEntry, InteractionEntry},
};

use crate::source::{decode_rows, KnowledgeSource};

const EMBEDDED_DATASET: &str = include_str!("../data/fallback.toml");

/// Top-level shape of a fallback dataset document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FallbackDataset {
    #[serde(default)]
    pub interactions: Vec<InteractionEntry>,
    #[serde(default)]
    pub contraindications: Vec<ContraindicationEntry>,
    #[serde(default)]
    pub allergy_mappings: Vec<AllergyMapping>,
}

impl FallbackDataset {
    /// Parse a dataset from TOML.
    ///
    /// Unlike remote rows, the embedded dataset is curated with the code, so
    /// any malformed entry rejects the whole document.
    pub fn from_toml_str(s: &str) -> SafetyResult<Self> {
        toml::from_str(s).map_err(|e| SafetyError::ConfigError {
            reason: format!("failed to parse fallback dataset TOML: {}", e),
        })
    }

    pub fn embedded() -> SafetyResult<Self> {
        Self::from_toml_str(EMBEDDED_DATASET)
    }

    /// Parse an externally maintained dataset, skipping malformed rows.
    ///
    /// Only a document that is not valid TOML at all is an error. Rows with
    /// an unknown severity or a missing column are dropped with a warning,
    /// the same way remote rows are.
    pub fn from_toml_str_lenient(source_name: &str, s: &str) -> SafetyResult<Self> {
        let mut document: toml::Table = toml::from_str(s).map_err(|e| SafetyError::ConfigError {
            reason: format!("failed to parse dataset TOML from '{}': {}", source_name, e),
        })?;

        Ok(Self {
            interactions: decode_rows(
                source_name,
                CollectionKind::Interactions,
                table_rows(source_name, CollectionKind::Interactions, &mut document),
            ),
            contraindications: decode_rows(
                source_name,
                CollectionKind::Contraindications,
                table_rows(source_name, CollectionKind::Contraindications, &mut document),
            ),
            allergy_mappings: decode_rows(
                source_name,
                CollectionKind::AllergyMappings,
                table_rows(source_name, CollectionKind::AllergyMappings, &mut document),
            ),
        })
    }

    /// Load a dataset from a TOML file on disk, skipping malformed rows.
    pub fn from_file(path: &Path) -> SafetyResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SafetyError::ConfigError {
            reason: format!("failed to read dataset file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str_lenient(&path.display().to_string(), &contents)
    }
}

/// Key of each collection's array of tables in a dataset document.
fn document_key(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Interactions => "interactions",
        CollectionKind::Contraindications => "contraindications",
        CollectionKind::AllergyMappings => "allergy_mappings",
    }
}

/// Take one collection's rows out of a parsed document as JSON values.
fn table_rows(
    source_name: &str,
    kind: CollectionKind,
    document: &mut toml::Table,
) -> Vec<serde_json::Value> {
    let rows = match document.remove(document_key(kind)) {
        Some(toml::Value::Array(rows)) => rows,
        Some(other) => {
            warn!(
                source = %source_name,
                collection = %kind,
                found = other.type_str(),
                "dataset collection is not an array of tables; ignoring it"
            );
            return Vec::new();
        }
        None => return Vec::new(),
    };

    rows.into_iter()
        .filter_map(|row| match serde_json::to_value(row) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    source = %source_name,
                    collection = %kind,
                    error = %e,
                    "unconvertible dataset row"
                );
                None
            }
        })
        .collect()
}

/// A `KnowledgeSource` serving an in-memory dataset.
#[derive(Debug, Clone)]
pub struct StaticKnowledgeSource {
    name: String,
    dataset: FallbackDataset,
}

impl StaticKnowledgeSource {
    pub fn new(name: impl Into<String>, dataset: FallbackDataset) -> Self {
        Self {
            name: name.into(),
            dataset,
        }
    }

}

impl KnowledgeSource for StaticKnowledgeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_interactions(&self) -> SafetyResult<Vec<InteractionEntry>> {
        Ok(self.dataset.interactions.clone())
    }

    fn fetch_contraindications(&self) -> SafetyResult<Vec<ContraindicationEntry>> {
        Ok(self.dataset.contraindications.clone())
    }

    fn fetch_allergy_mappings(&self) -> SafetyResult<Vec<AllergyMapping>> {
        Ok(self.dataset.allergy_mappings.clone())
    }
}
