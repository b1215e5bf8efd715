//! Deterministic, monotonic risk escalation.
//!
//! Two passes run over an analysis:
//!
//! 1. **Allergy conflict**: each unreported allergy conflict becomes an
//!    absolute contraindication; a `Low` analysis is raised to `High` (≥ 75).
//! 2. **Severity recount**: over the final finding lists, any absolute
//!    contraindication or contraindicated interaction raises to `Critical`
//!    (≥ 90); otherwise more than one major interaction raises to `High`
//!    (≥ 70).
//!
//! Both passes only ever raise. Scores move through `max(current, floor)` and
//! levels through `max(current, target)` on `Low < Medium < High < Critical`.

use serde::Serialize;
use tracing::info;

use rxguard_contracts::{
    analysis::{ContraindicationFinding, DraftRecommendation, RiskLevel},
    knowledge::{AllergyMapping, ContraindicationSeverity, InteractionSeverity},
};

/// Score floor applied when an allergy conflict escalates a low-risk draft.
pub const ALLERGY_SCORE_FLOOR: f64 = 75.0;
/// Score floor for a critical recount.
pub const CRITICAL_SCORE_FLOOR: f64 = 90.0;
/// Score floor for a high recount.
pub const HIGH_SCORE_FLOOR: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPass {
    AllergyConflict,
    SeverityRecount,
}

/// One change the escalator made to an analysis' risk fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Escalation {
    pub pass: EscalationPass,
    pub from_level: RiskLevel,
    pub to_level: RiskLevel,
    pub from_score: f64,
    pub to_score: f64,
    pub reason: String,
}

/// Raise `analysis` to at least `level` and `floor`. Returns the change, if
/// there was one.
fn raise(
    analysis: &mut DraftRecommendation,
    pass: EscalationPass,
    level: RiskLevel,
    floor: f64,
    reason: String,
) -> Option<Escalation> {
    let from_level = analysis.overall_risk_level;
    let from_score = analysis.risk_score;

    analysis.overall_risk_level = from_level.max(level);
    analysis.risk_score = from_score.max(floor);

    if analysis.overall_risk_level == from_level && analysis.risk_score == from_score {
        return None;
    }

    info!(
        pass = ?pass,
        from_level = %from_level,
        to_level = %analysis.overall_risk_level,
        from_score,
        to_score = analysis.risk_score,
        reason = %reason,
        "risk escalated"
    );

    Some(Escalation {
        pass,
        from_level,
        to_level: analysis.overall_risk_level,
        from_score,
        to_score: analysis.risk_score,
        reason,
    })
}

// ── Pass 1 ────────────────────────────────────────────────────────────────────

/// The contraindication synthesized for an allergy conflict.
pub fn allergy_contraindication(
    proposed: &str,
    mapping: &AllergyMapping,
) -> ContraindicationFinding {
    ContraindicationFinding {
        medication: proposed.to_string(),
        condition: format!("Allergy to {}", mapping.allergy),
        severity: ContraindicationSeverity::Absolute,
        description: format!(
            "Patient has allergy to {} which may cross-react with {}",
            mapping.allergy, proposed
        ),
        recommendation: format!(
            "Consider alternative medication. Cross-reactants: {}",
            mapping.cross_reactants.join(", ")
        ),
    }
}

/// Pass 1 for one unreported allergy conflict: append the synthesized
/// contraindication, then raise a `Low` analysis to `High`.
pub fn apply_allergy_conflict(
    analysis: &mut DraftRecommendation,
    proposed: &str,
    mapping: &AllergyMapping,
) -> Option<Escalation> {
    analysis
        .contraindications
        .push(allergy_contraindication(proposed, mapping));

    if analysis.overall_risk_level != RiskLevel::Low {
        return None;
    }

    raise(
        analysis,
        EscalationPass::AllergyConflict,
        RiskLevel::High,
        ALLERGY_SCORE_FLOOR,
        format!("allergy to {} cross-reacts with {}", mapping.allergy, proposed),
    )
}

// ── Pass 2 ────────────────────────────────────────────────────────────────────

/// Severity tallies over an analysis' finding lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeverityCounts {
    /// Interactions of severity `Major` or `Contraindicated`.
    pub major_interactions: usize,
    pub contraindicated_interactions: usize,
    pub absolute_contraindications: usize,
}

impl SeverityCounts {
    pub fn of(analysis: &DraftRecommendation) -> Self {
        let mut counts = Self::default();
        for interaction in &analysis.drug_interactions {
            if interaction.severity.is_major() {
                counts.major_interactions += 1;
            }
            if interaction.severity == InteractionSeverity::Contraindicated {
                counts.contraindicated_interactions += 1;
            }
        }
        counts.absolute_contraindications = analysis
            .contraindications
            .iter()
            .filter(|c| c.severity == ContraindicationSeverity::Absolute)
            .count();
        counts
    }
}

/// Pass 2: recompute the risk classification from the final finding lists.
pub fn recount(analysis: &mut DraftRecommendation) -> Option<Escalation> {
    let counts = SeverityCounts::of(analysis);

    if counts.absolute_contraindications > 0 || counts.contraindicated_interactions > 0 {
        raise(
            analysis,
            EscalationPass::SeverityRecount,
            RiskLevel::Critical,
            CRITICAL_SCORE_FLOOR,
            format!(
                "{} absolute contraindication(s), {} contraindicated interaction(s)",
                counts.absolute_contraindications, counts.contraindicated_interactions
            ),
        )
    } else if counts.major_interactions > 1 {
        raise(
            analysis,
            EscalationPass::SeverityRecount,
            RiskLevel::High,
            HIGH_SCORE_FLOOR,
            format!("{} major interactions", counts.major_interactions),
        )
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
