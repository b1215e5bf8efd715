//! Structural checks at the edge of the engine.
//!
//! Each document is handled in two phases:
//!
//! 1. **Structural**: the JSON value is validated against its schema. All
//!    violations are collected before returning so the producer sees the full
//!    failure set in one pass.
//! 2. **Typed**: the value is decoded into its contract type.
//!
//! The engine only ever sees documents that passed both phases.

use std::fmt;
use std::path::Path;

use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use rxguard_contracts::{
    analysis::{DraftRecommendation, EnrichedAnalysis},
    error::{SafetyError, SafetyResult},
    patient::PatientProfile,
};

use crate::schema::{draft_schema, patient_schema};

/// Which inbound document a check concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Draft,
    Patient,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Draft => "draft recommendation",
            DocumentKind::Patient => "patient profile",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled validators for both inbound documents.
///
/// Compile once and reuse; validation itself does not allocate schemas.
pub struct BoundaryVerifier {
    draft: Validator,
    patient: Validator,
}

impl BoundaryVerifier {
    pub fn new() -> SafetyResult<Self> {
        Ok(Self {
            draft: compile(DocumentKind::Draft, &draft_schema())?,
            patient: compile(DocumentKind::Patient, &patient_schema())?,
        })
    }

    fn validator(&self, kind: DocumentKind) -> &Validator {
        match kind {
            DocumentKind::Draft => &self.draft,
            DocumentKind::Patient => &self.patient,
        }
    }

    /// Every schema violation in `document`, formatted with its location.
    pub fn violations(&self, kind: DocumentKind, document: &Value) -> Vec<String> {
        self.validator(kind)
            .iter_errors(document)
            .map(|error| format!("at {}: {}", error.instance_path, error))
            .collect()
    }

    /// Validate then decode a draft recommendation.
    pub fn parse_draft(&self, document: &Value) -> SafetyResult<DraftRecommendation> {
        self.parse(DocumentKind::Draft, document)
    }

    /// Validate then decode a patient profile.
    pub fn parse_patient(&self, document: &Value) -> SafetyResult<PatientProfile> {
        self.parse(DocumentKind::Patient, document)
    }

    /// Confirm an enriched analysis still satisfies the draft schema.
    pub fn check_enriched(&self, analysis: &EnrichedAnalysis) -> SafetyResult<()> {
        let document = serde_json::to_value(analysis).map_err(|e| SafetyError::DraftParse {
            document: "enriched analysis".to_string(),
            reason: e.to_string(),
        })?;
        self.check(DocumentKind::Draft, &document)
    }

    fn check(&self, kind: DocumentKind, document: &Value) -> SafetyResult<()> {
        let violations = self.violations(kind, document);
        if violations.is_empty() {
            debug!(document = %kind, "structural validation passed");
            return Ok(());
        }

        for message in &violations {
            warn!(document = %kind, %message, "structural validation failure");
        }
        Err(SafetyError::SchemaValidation {
            reason: format!(
                "{} violation(s) in {}: {}",
                violations.len(),
                kind,
                violations.join("; ")
            ),
        })
    }

    fn parse<T: DeserializeOwned>(&self, kind: DocumentKind, document: &Value) -> SafetyResult<T> {
        self.check(kind, document)?;
        T::deserialize(document).map_err(|e| SafetyError::DraftParse {
            document: kind.to_string(),
            reason: e.to_string(),
        })
    }
}

fn compile(kind: DocumentKind, schema: &Value) -> SafetyResult<Validator> {
    jsonschema::validator_for(schema).map_err(|e| SafetyError::ConfigError {
        reason: format!("invalid {kind} schema: {e}"),
    })
}

/// Read a JSON document from disk.
pub fn load_json(path: &Path) -> SafetyResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| SafetyError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| SafetyError::DraftParse {
        document: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
