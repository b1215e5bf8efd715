//! The enrichment pipeline: cross-check a draft against the knowledge base.
//!
//!   Interactions → Contraindications → Allergy conflicts (Pass 1) → Recount (Pass 2)
//!
//! The pipeline is a pure transformation over in-memory data. It never fails:
//! a draft without a proposed medication is returned as given, and an empty
//! knowledge base simply yields no findings. Running it twice adds nothing
//! the first run did not, because every appended finding covers itself.

use serde::Serialize;
use tracing::{debug, info, warn};

use rxguard_contracts::{
    analysis::{
        ContraindicationFinding, DraftRecommendation, DrugInteractionFinding, EnrichedAnalysis,
    },
    patient::PatientProfile,
};
use rxguard_knowledge::KnowledgeBase;

use crate::dedup::{allergy_conflict_covered, contraindication_covered, interaction_covered};
use crate::escalator::{apply_allergy_conflict, recount, Escalation};
use crate::matcher::{
    find_allergy_conflicts, find_contraindications, find_interactions, SubstringMatcher,
    TermMatcher,
};

/// Everything one enrichment run appended, suppressed or escalated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentTrace {
    pub appended_interactions: Vec<DrugInteractionFinding>,
    /// Both database contraindications and allergy-derived ones.
    pub appended_contraindications: Vec<ContraindicationFinding>,
    pub suppressed_interactions: usize,
    pub suppressed_contraindications: usize,
    pub suppressed_allergy_conflicts: usize,
    pub escalations: Vec<Escalation>,
    /// The draft had no proposed medication, so nothing was checked.
    pub skipped: bool,
}

impl EnrichmentTrace {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// True if the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.appended_interactions.is_empty()
            && self.appended_contraindications.is_empty()
            && self.escalations.is_empty()
    }
}

/// Enrich `draft` with the default substring matcher.
pub fn enrich(
    draft: DraftRecommendation,
    patient: &PatientProfile,
    kb: &KnowledgeBase,
) -> EnrichedAnalysis {
    enrich_with_trace(draft, patient, kb, &SubstringMatcher).0
}

/// Enrich `draft` and report what changed.
pub fn enrich_with_trace(
    mut draft: DraftRecommendation,
    patient: &PatientProfile,
    kb: &KnowledgeBase,
    matcher: &dyn TermMatcher,
) -> (EnrichedAnalysis, EnrichmentTrace) {
    let proposed = match draft.proposed_medication() {
        Some(medication) => medication.to_string(),
        None => {
            warn!("draft has no proposed medication, returning it unmodified");
            return (draft, EnrichmentTrace::skipped());
        }
    };

    debug!(
        proposed = %proposed,
        medications = patient.current_medications.len(),
        conditions = patient.conditions.len(),
        allergies = patient.allergies.len(),
        "enrichment starting"
    );

    let mut trace = EnrichmentTrace::default();

    // ── Step 1: Interactions across current medications and the proposal ────
    let mut medications: Vec<&str> = patient.medication_names().collect();
    medications.push(&proposed);

    for found in find_interactions(matcher, &medications, &kb.interactions) {
        let entry = found.entry;
        if interaction_covered(matcher, &draft.drug_interactions, entry) {
            debug!(drug_a = %entry.drug_a, drug_b = %entry.drug_b, "interaction already reported");
            trace.suppressed_interactions += 1;
            continue;
        }

        let finding = DrugInteractionFinding {
            drug1: entry.drug_a.clone(),
            drug2: entry.drug_b.clone(),
            severity: entry.severity,
            description: entry.description.clone(),
            recommendation: format!("Database flagged: {}", entry.mechanism),
        };
        info!(
            drug1 = %finding.drug1,
            drug2 = %finding.drug2,
            severity = %finding.severity,
            "interaction appended"
        );
        draft.drug_interactions.push(finding.clone());
        trace.appended_interactions.push(finding);
    }

    // ── Step 2: Contraindications of the proposal for patient conditions ─────
    let contraindications =
        find_contraindications(matcher, &proposed, &patient.conditions, &kb.contraindications);
    for entry in contraindications {
        if contraindication_covered(matcher, &draft.contraindications, entry) {
            debug!(
                drug = %entry.drug,
                condition = %entry.condition,
                "contraindication already reported"
            );
            trace.suppressed_contraindications += 1;
            continue;
        }

        let finding = ContraindicationFinding {
            medication: entry.drug.clone(),
            condition: entry.condition.clone(),
            severity: entry.severity,
            description: entry.description.clone(),
            recommendation: "Verified by drug database".to_string(),
        };
        info!(
            medication = %finding.medication,
            condition = %finding.condition,
            severity = %finding.severity,
            "contraindication appended"
        );
        draft.contraindications.push(finding.clone());
        trace.appended_contraindications.push(finding);
    }

    // ── Step 3: Allergy conflicts, escalated by Pass 1 ───────────────────────
    let conflicts =
        find_allergy_conflicts(matcher, &patient.allergies, &proposed, &kb.allergy_mappings);
    for mapping in conflicts {
        if allergy_conflict_covered(&draft.contraindications) {
            debug!(allergy = %mapping.allergy, "allergy conflict already reported");
            trace.suppressed_allergy_conflicts += 1;
            continue;
        }

        let escalation = apply_allergy_conflict(&mut draft, &proposed, mapping);
        if let Some(added) = draft.contraindications.last() {
            info!(
                allergy = %mapping.allergy,
                proposed = %proposed,
                "allergy contraindication appended"
            );
            trace.appended_contraindications.push(added.clone());
        }
        trace.escalations.extend(escalation);
    }

    // ── Step 4: Pass 2 over the complete finding set ─────────────────────────
    trace.escalations.extend(recount(&mut draft));

    debug!(
        appended_interactions = trace.appended_interactions.len(),
        appended_contraindications = trace.appended_contraindications.len(),
        escalations = trace.escalations.len(),
        risk_level = %draft.overall_risk_level,
        risk_score = draft.risk_score,
        "enrichment finished"
    );

    (draft, trace)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use rxguard_contracts::{
        analysis::RiskLevel,
        knowledge::{
            ContraindicationEntry, ContraindicationSeverity, InteractionEntry, InteractionSeverity,
        },
        patient::MedicationRecord,
    };

    use super::*;
    use crate::escalator::EscalationPass;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::embedded().unwrap()
    }

    fn patient(medications: &[&str], conditions: &[&str], allergies: &[&str]) -> PatientProfile {
        PatientProfile {
            current_medications: medications
                .iter()
                .map(|m| MedicationRecord::new(*m, "", ""))
                .collect(),
            conditions: conditions.iter().map(|c| c.to_string()).collect(),
            allergies: allergies.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn interaction(
        drug1: &str,
        drug2: &str,
        severity: InteractionSeverity,
    ) -> DrugInteractionFinding {
        DrugInteractionFinding {
            drug1: drug1.to_string(),
            drug2: drug2.to_string(),
            severity,
            description: String::new(),
            recommendation: String::new(),
        }
    }

    // ── Escalation scenarios ─────────────────────────────────────────────────

    #[test]
    fn single_major_interaction_leaves_risk_unchanged() {
        let draft = DraftRecommendation::minimal("Aspirin", RiskLevel::Medium, 40.0);
        let (enriched, trace) =
            enrich_with_trace(draft, &patient(&["Warfarin"], &[], &[]), &kb(), &SubstringMatcher);

        assert_eq!(enriched.drug_interactions.len(), 1);
        let added = &enriched.drug_interactions[0];
        assert_eq!(added.drug1, "warfarin");
        assert_eq!(added.drug2, "aspirin");
        assert_eq!(added.severity, InteractionSeverity::Major);
        assert!(added.recommendation.starts_with("Database flagged: "));

        assert_eq!(enriched.overall_risk_level, RiskLevel::Medium);
        assert_eq!(enriched.risk_score, 40.0);
        assert!(trace.escalations.is_empty());
    }

    #[test]
    fn penicillin_allergy_escalates_through_both_passes() {
        let draft = DraftRecommendation::minimal("Amoxicillin", RiskLevel::Low, 25.0);
        let (enriched, trace) =
            enrich_with_trace(draft, &patient(&[], &[], &["penicillin"]), &kb(), &SubstringMatcher);

        assert_eq!(enriched.contraindications.len(), 1);
        let added = &enriched.contraindications[0];
        assert_eq!(added.condition, "Allergy to penicillin");
        assert_eq!(added.severity, ContraindicationSeverity::Absolute);
        assert_eq!(added.medication, "Amoxicillin");

        // Pass 1 lifts low/25 to high/75.
        let first = &trace.escalations[0];
        assert_eq!(first.pass, EscalationPass::AllergyConflict);
        assert_eq!((first.to_level, first.to_score), (RiskLevel::High, 75.0));

        // The absolute contraindication then makes Pass 2 go critical.
        assert_eq!(trace.escalations[1].pass, EscalationPass::SeverityRecount);
        assert_eq!(enriched.overall_risk_level, RiskLevel::Critical);
        assert_eq!(enriched.risk_score, 90.0);
    }

    #[test]
    fn two_reported_major_interactions_raise_to_high() {
        let mut draft = DraftRecommendation::minimal("Paracetamol", RiskLevel::Medium, 55.0);
        draft.drug_interactions = vec![
            interaction("drug-a", "drug-b", InteractionSeverity::Major),
            interaction("drug-c", "drug-d", InteractionSeverity::Major),
        ];

        let enriched = enrich(draft, &PatientProfile::default(), &kb());
        assert_eq!(enriched.overall_risk_level, RiskLevel::High);
        assert_eq!(enriched.risk_score, 70.0);
    }

    #[test]
    fn reported_contraindicated_interaction_raises_to_critical() {
        let mut draft = DraftRecommendation::minimal("Paracetamol", RiskLevel::Low, 93.0);
        draft.drug_interactions = vec![
            interaction("drug-a", "drug-b", InteractionSeverity::Contraindicated),
            interaction("drug-c", "drug-d", InteractionSeverity::Minor),
        ];

        let enriched = enrich(draft, &PatientProfile::default(), &kb());
        assert_eq!(enriched.overall_risk_level, RiskLevel::Critical);
        assert_eq!(enriched.risk_score, 93.0);
    }

    #[test]
    fn empty_patient_and_minimal_draft_is_unchanged() {
        let draft = DraftRecommendation::minimal("Amoxicillin", RiskLevel::Low, 10.0);
        let before = serde_json::to_string(&draft).unwrap();

        let (enriched, trace) =
            enrich_with_trace(draft, &PatientProfile::default(), &kb(), &SubstringMatcher);

        assert_eq!(serde_json::to_string(&enriched).unwrap(), before);
        assert!(trace.is_noop());
        assert!(!trace.skipped);
    }

    // ── Contraindications ────────────────────────────────────────────────────

    #[test]
    fn condition_contraindication_is_appended_and_recounted() {
        let draft = DraftRecommendation::minimal("Sildenafil 50mg", RiskLevel::Low, 20.0);
        let enriched = enrich(draft, &patient(&[], &["Unstable angina"], &[]), &kb());

        assert_eq!(enriched.contraindications.len(), 1);
        let added = &enriched.contraindications[0];
        assert_eq!(added.medication, "sildenafil");
        assert_eq!(added.condition, "unstable angina");
        assert_eq!(added.recommendation, "Verified by drug database");
        assert_eq!(enriched.overall_risk_level, RiskLevel::Critical);
        assert_eq!(enriched.risk_score, 90.0);
    }

    #[test]
    fn relative_contraindication_does_not_escalate() {
        let draft = DraftRecommendation::minimal("Metoprolol", RiskLevel::Low, 20.0);
        let enriched = enrich(draft, &patient(&[], &["asthma"], &[]), &kb());

        assert_eq!(enriched.contraindications.len(), 1);
        assert_eq!(enriched.contraindications[0].severity, ContraindicationSeverity::Relative);
        assert_eq!(enriched.overall_risk_level, RiskLevel::Low);
        assert_eq!(enriched.risk_score, 20.0);
    }

    #[test]
    fn nitrate_with_sildenafil_is_critical() {
        let draft = DraftRecommendation::minimal("Sildenafil", RiskLevel::Medium, 30.0);
        let enriched = enrich(draft, &patient(&["Nitroglycerin 0.4mg"], &[], &[]), &kb());

        assert_eq!(enriched.drug_interactions.len(), 1);
        assert_eq!(enriched.drug_interactions[0].severity, InteractionSeverity::Contraindicated);
        assert_eq!(enriched.overall_risk_level, RiskLevel::Critical);
        assert_eq!(enriched.risk_score, 90.0);
    }

    // ── Deduplication ────────────────────────────────────────────────────────

    #[test]
    fn reported_interaction_is_not_appended_again() {
        let mut draft = DraftRecommendation::minimal("Aspirin", RiskLevel::Medium, 40.0);
        draft.drug_interactions =
            vec![interaction("Warfarin", "Aspirin", InteractionSeverity::Major)];

        let (enriched, trace) =
            enrich_with_trace(draft, &patient(&["Warfarin"], &[], &[]), &kb(), &SubstringMatcher);
        assert_eq!(enriched.drug_interactions.len(), 1);
        assert_eq!(trace.suppressed_interactions, 1);
    }

    #[test]
    fn only_one_allergy_contraindication_is_reported() {
        // Both the aspirin and the nsaids mappings list ibuprofen.
        let draft = DraftRecommendation::minimal("Ibuprofen", RiskLevel::Low, 10.0);
        let (enriched, trace) = enrich_with_trace(
            draft,
            &patient(&[], &[], &["aspirin", "NSAIDs"]),
            &kb(),
            &SubstringMatcher,
        );

        assert_eq!(enriched.contraindications.len(), 1);
        assert_eq!(enriched.contraindications[0].condition, "Allergy to aspirin");
        assert_eq!(trace.suppressed_allergy_conflicts, 1);
    }

    #[test]
    fn appended_findings_are_not_covered_by_the_original_draft() {
        let mut draft = DraftRecommendation::minimal("Ibuprofen", RiskLevel::Low, 10.0);
        draft.drug_interactions =
            vec![interaction("Sertraline", "Sumatriptan", InteractionSeverity::Major)];
        let original = draft.clone();

        let (_, trace) = enrich_with_trace(
            draft,
            &patient(&["Warfarin", "Lisinopril"], &["pregnancy"], &[]),
            &kb(),
            &SubstringMatcher,
        );

        assert!(!trace.appended_interactions.is_empty());
        for finding in &trace.appended_interactions {
            let entry = InteractionEntry {
                drug_a: finding.drug1.clone(),
                drug_b: finding.drug2.clone(),
                severity: finding.severity,
                description: String::new(),
                mechanism: String::new(),
            };
            assert!(!interaction_covered(&SubstringMatcher, &original.drug_interactions, &entry));
        }
        for finding in &trace.appended_contraindications {
            let entry = ContraindicationEntry {
                drug: finding.medication.clone(),
                condition: finding.condition.clone(),
                severity: finding.severity,
                description: String::new(),
            };
            assert!(!contraindication_covered(
                &SubstringMatcher,
                &original.contraindications,
                &entry
            ));
        }
    }

    // ── Properties ───────────────────────────────────────────────────────────

    #[test]
    fn enrichment_is_idempotent() {
        let kb = kb();
        let profile = patient(
            &["Warfarin 5mg", "Lisinopril", "Sertraline"],
            &["pregnancy", "asthma"],
            &["ace inhibitors"],
        );
        let draft = DraftRecommendation::minimal("Ibuprofen 400mg", RiskLevel::Low, 15.0);

        let once = enrich(draft, &profile, &kb);
        let (twice, trace) = enrich_with_trace(once.clone(), &profile, &kb, &SubstringMatcher);

        assert_eq!(once, twice);
        assert!(trace.is_noop());
    }

    #[test]
    fn risk_never_decreases() {
        let kb = kb();
        let profile = patient(&["Warfarin"], &["severe heart failure"], &["penicillin"]);

        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High, RiskLevel::Critical] {
            for score in [0.0, 25.0, 25.5, 70.0, 74.9, 75.0, 90.0, 100.0] {
                for medication in ["Aspirin", "Amoxicillin", "Sildenafil", "Paracetamol"] {
                    let draft = DraftRecommendation::minimal(medication, level, score);
                    let enriched = enrich(draft, &profile, &kb);
                    assert!(enriched.risk_score >= score);
                    assert!(enriched.overall_risk_level >= level);
                }
            }
        }
    }

    #[test]
    fn empty_knowledge_base_adds_no_findings() {
        let draft = DraftRecommendation::minimal("Aspirin", RiskLevel::Low, 10.0);
        let profile = patient(&["Warfarin"], &[], &["nsaids"]);
        let enriched = enrich(draft.clone(), &profile, &KnowledgeBase::empty());
        assert_eq!(enriched, draft);
    }

    // ── Missing medication ───────────────────────────────────────────────────

    #[test]
    fn missing_medication_returns_draft_unmodified() {
        let mut draft = DraftRecommendation::minimal("", RiskLevel::Low, 10.0);
        draft.drug_interactions = vec![
            interaction("drug-a", "drug-b", InteractionSeverity::Major),
            interaction("drug-c", "drug-d", InteractionSeverity::Contraindicated),
        ];

        let profile = patient(&["Warfarin"], &[], &[]);
        let (enriched, trace) =
            enrich_with_trace(draft.clone(), &profile, &kb(), &SubstringMatcher);

        assert_eq!(enriched, draft);
        assert!(trace.skipped);
    }

    #[test]
    fn absent_medication_field_returns_draft_unmodified() {
        let mut draft = DraftRecommendation::minimal("x", RiskLevel::Medium, 50.0);
        draft.primary_recommendation.medication = None;

        let enriched = enrich(draft.clone(), &PatientProfile::default(), &kb());
        assert_eq!(enriched, draft);
    }
}
