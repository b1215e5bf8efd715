//! Suppression of knowledge-base findings the draft already reports.
//!
//! Each predicate is checked against the analysis as it grows, so a finding
//! appended earlier in the same run also covers later candidates.

use rxguard_contracts::{
    analysis::{ContraindicationFinding, DrugInteractionFinding},
    knowledge::{ContraindicationEntry, InteractionEntry},
};

use crate::matcher::TermMatcher;
use crate::normalize::fold;

/// Marker searched for in existing contraindication conditions.
const ALLERGY_MARKER: &str = "allergy";

/// True if an existing finding covers `candidate`.
///
/// Deliberately loose: sharing either the first drug or the second drug with
/// an existing finding is enough. Fully different pairs are still reported;
/// partially overlapping ones are not.
pub fn interaction_covered(
    matcher: &dyn TermMatcher,
    existing: &[DrugInteractionFinding],
    candidate: &InteractionEntry,
) -> bool {
    let drug_a = fold(&candidate.drug_a);
    let drug_b = fold(&candidate.drug_b);

    existing.iter().any(|finding| {
        matcher.matches(&fold(&finding.drug1), &drug_a)
            || matcher.matches(&fold(&finding.drug2), &drug_b)
    })
}

/// True if an existing finding names the same drug and the same condition.
pub fn contraindication_covered(
    matcher: &dyn TermMatcher,
    existing: &[ContraindicationFinding],
    candidate: &ContraindicationEntry,
) -> bool {
    let drug = fold(&candidate.drug);
    let condition = fold(&candidate.condition);

    existing.iter().any(|finding| {
        matcher.matches(&fold(&finding.medication), &drug)
            && matcher.matches(&fold(&finding.condition), &condition)
    })
}

/// True if any existing contraindication already concerns an allergy.
///
/// At most one allergy-derived contraindication is ever reported per
/// analysis, whatever allergy it names.
pub fn allergy_conflict_covered(existing: &[ContraindicationFinding]) -> bool {
    existing
        .iter()
        .any(|finding| finding.condition.to_lowercase().contains(ALLERGY_MARKER))
}
