//! Draft recommendation and finding types.
//!
//! `DraftRecommendation` mirrors the JSON document the reasoning collaborator
//! returns (camelCase keys). The engine reads only the risk fields, the
//! proposed medication and the two finding lists; everything else is carried
//! through untouched so the enriched analysis stays schema-compatible.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::knowledge::{ContraindicationSeverity, InteractionSeverity};

/// Upper bound of `risk_score`.
pub const MAX_RISK_SCORE: f64 = 100.0;

// ── RiskLevel ─────────────────────────────────────────────────────────────────

/// Overall risk classification, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Findings ──────────────────────────────────────────────────────────────────

/// A drug-drug interaction attached to one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugInteractionFinding {
    pub drug1: String,
    pub drug2: String,
    pub severity: InteractionSeverity,
    pub description: String,
    pub recommendation: String,
}

/// A drug-condition contraindication attached to one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContraindicationFinding {
    pub medication: String,
    pub condition: String,
    pub severity: ContraindicationSeverity,
    pub description: String,
    pub recommendation: String,
}

// ── Treatment plan ────────────────────────────────────────────────────────────

/// The medication the draft proposes, with its regimen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecommendation {
    /// Absent only when the upstream producer violated its contract; the
    /// engine then leaves the draft untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub route: String,
    #[serde(default, serialize_with = "score::serialize")]
    pub confidence_score: f64,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub monitoring_required: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeTreatment {
    pub medication: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default, serialize_with = "score::serialize")]
    pub confidence_score: f64,
    #[serde(default)]
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub factor: String,
    pub severity: FactorSeverity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mitigation: String,
}

// ── Draft / enriched analysis ─────────────────────────────────────────────────

/// A treatment proposal as produced by the external reasoning collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecommendation {
    pub overall_risk_level: RiskLevel,
    /// 0..=100, fractional values allowed.
    #[serde(serialize_with = "score::serialize")]
    pub risk_score: f64,
    #[serde(default)]
    pub summary_assessment: String,

    pub primary_recommendation: TreatmentRecommendation,
    #[serde(default)]
    pub alternative_treatments: Vec<AlternativeTreatment>,

    #[serde(default)]
    pub drug_interactions: Vec<DrugInteractionFinding>,
    #[serde(default)]
    pub contraindications: Vec<ContraindicationFinding>,
    #[serde(default)]
    pub risk_factors: Vec<RiskFactor>,

    #[serde(default)]
    pub lifestyle_recommendations: Vec<String>,
    #[serde(default)]
    pub follow_up_recommendations: Vec<String>,
    #[serde(default)]
    pub lab_tests_recommended: Vec<String>,

    #[serde(default)]
    pub analysis_timestamp: String,
    #[serde(default)]
    pub model_version: String,
    #[serde(default)]
    pub disclaimer: String,
}

/// A draft after the safety engine has cross-checked it. Same shape, so it
/// can be persisted or rendered wherever a draft can.
pub type EnrichedAnalysis = DraftRecommendation;

impl DraftRecommendation {
    /// A draft with the given risk fields and proposed medication and every
    /// other field empty.
    pub fn minimal(medication: impl Into<String>, level: RiskLevel, score: f64) -> Self {
        Self {
            overall_risk_level: level,
            risk_score: score.clamp(0.0, MAX_RISK_SCORE),
            summary_assessment: String::new(),
            primary_recommendation: TreatmentRecommendation {
                medication: Some(medication.into()),
                ..TreatmentRecommendation::default()
            },
            alternative_treatments: Vec::new(),
            drug_interactions: Vec::new(),
            contraindications: Vec::new(),
            risk_factors: Vec::new(),
            lifestyle_recommendations: Vec::new(),
            follow_up_recommendations: Vec::new(),
            lab_tests_recommended: Vec::new(),
            analysis_timestamp: String::new(),
            model_version: String::new(),
            disclaimer: String::new(),
        }
    }

    /// The proposed medication, or `None` if it is missing or blank.
    pub fn proposed_medication(&self) -> Option<&str> {
        self.primary_recommendation
            .medication
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

// ── Score wire format ─────────────────────────────────────────────────────────

/// Scores are written back as integers when they have no fractional part, so
/// a draft scored `25` is not echoed as `25.0`.
mod score {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.fract() == 0.0 && (0.0..=u64::MAX as f64).contains(value) {
            serializer.serialize_u64(*value as u64)
        } else {
            serializer.serialize_f64(*value)
        }
    }
}
