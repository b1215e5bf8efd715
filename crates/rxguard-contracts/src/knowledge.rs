//! Knowledge-base record types and their severity vocabularies.
//!
//! Field names on the wire follow the remote store's column names
//! (`drug1`, `drug2`, `drug_classes`, `cross_reactants`), so the same
//! types decode remote rows and the embedded fallback dataset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SafetyError;

// ── Severities ────────────────────────────────────────────────────────────────

/// Severity of a drug-drug interaction.
///
/// Decoding is case-insensitive, since remote stores are not consistent
/// about capitalization.
///
/// Declaration order is the clinical ordering, so the derived `Ord` gives
/// `Minor < Moderate < Major < Contraindicated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

impl InteractionSeverity {
    /// True for the two severities counted as "major" by the risk escalator.
    pub fn is_major(self) -> bool {
        matches!(self, Self::Major | Self::Contraindicated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
            Self::Contraindicated => "contraindicated",
        }
    }
}

impl FromStr for InteractionSeverity {
    type Err = SafetyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minor" => Ok(Self::Minor),
            "moderate" => Ok(Self::Moderate),
            "major" => Ok(Self::Major),
            "contraindicated" => Ok(Self::Contraindicated),
            other => Err(SafetyError::MalformedEntry {
                reason: format!("unrecognized interaction severity '{other}'"),
            }),
        }
    }
}

impl TryFrom<String> for InteractionSeverity {
    type Error = SafetyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for InteractionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a drug-condition contraindication (`Relative < Absolute`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ContraindicationSeverity {
    Relative,
    Absolute,
}

impl ContraindicationSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Absolute => "absolute",
        }
    }
}

impl FromStr for ContraindicationSeverity {
    type Err = SafetyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relative" => Ok(Self::Relative),
            "absolute" => Ok(Self::Absolute),
            other => Err(SafetyError::MalformedEntry {
                reason: format!("unrecognized contraindication severity '{other}'"),
            }),
        }
    }
}

impl TryFrom<String> for ContraindicationSeverity {
    type Error = SafetyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ContraindicationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Entries ───────────────────────────────────────────────────────────────────

/// A known interaction between two drugs. The pair is unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEntry {
    #[serde(rename = "drug1")]
    pub drug_a: String,
    #[serde(rename = "drug2")]
    pub drug_b: String,
    pub severity: InteractionSeverity,
    pub description: String,
    #[serde(default)]
    pub mechanism: String,
}

/// A drug that must not (absolute) or should cautiously (relative) be given
/// to a patient with a given condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContraindicationEntry {
    pub drug: String,
    pub condition: String,
    pub severity: ContraindicationSeverity,
    pub description: String,
}

/// Drugs that may cross-react with a recorded allergy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyMapping {
    pub allergy: String,
    #[serde(default)]
    pub drug_classes: Vec<String>,
    #[serde(default)]
    pub cross_reactants: Vec<String>,
}

/// The three collections that make up the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Interactions,
    Contraindications,
    AllergyMappings,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Interactions,
        CollectionKind::Contraindications,
        CollectionKind::AllergyMappings,
    ];

    /// Table name in the remote store.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Interactions => "drug_interactions",
            Self::Contraindications => "contraindications",
            Self::AllergyMappings => "allergy_mappings",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
