//! # rxguard-contracts
//!
//! Shared types and error contracts for the RXGUARD clinical safety engine.
//!
//! Every crate in the workspace imports from here. No business logic lives in
//! this crate, only data definitions, severity orderings and error types.

pub mod analysis;
pub mod error;
pub mod knowledge;
pub mod patient;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use analysis::{DraftRecommendation, RiskLevel};
    use error::SafetyError;
    use knowledge::{ContraindicationSeverity, InteractionEntry, InteractionSeverity};
    use patient::PatientProfile;

    // ── Orderings ────────────────────────────────────────────────────────────

    #[test]
    fn risk_levels_are_ordered_by_severity() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert_eq!(RiskLevel::Critical.max(RiskLevel::Low), RiskLevel::Critical);
    }

    #[test]
    fn interaction_severities_are_ordered() {
        assert!(InteractionSeverity::Minor < InteractionSeverity::Moderate);
        assert!(InteractionSeverity::Moderate < InteractionSeverity::Major);
        assert!(InteractionSeverity::Major < InteractionSeverity::Contraindicated);
        assert!(InteractionSeverity::Major.is_major());
        assert!(InteractionSeverity::Contraindicated.is_major());
        assert!(!InteractionSeverity::Moderate.is_major());
        assert!(ContraindicationSeverity::Relative < ContraindicationSeverity::Absolute);
    }

    // ── Parsing ──────────────────────────────────────────────────────────────

    #[test]
    fn severity_parsing_is_case_insensitive() {
        assert_eq!(
            " Major ".parse::<InteractionSeverity>().unwrap(),
            InteractionSeverity::Major
        );
        assert_eq!(
            "ABSOLUTE".parse::<ContraindicationSeverity>().unwrap(),
            ContraindicationSeverity::Absolute
        );
    }

    #[test]
    fn entry_severity_decodes_case_insensitively() {
        let entry: InteractionEntry = serde_json::from_value(json!({
            "drug1": "warfarin",
            "drug2": "aspirin",
            "severity": "Major",
            "description": "Increased risk of bleeding"
        }))
        .unwrap();
        assert_eq!(entry.severity, InteractionSeverity::Major);

        let reencoded = serde_json::to_value(&entry).unwrap();
        assert_eq!(reencoded["severity"], "major");

        let unknown = serde_json::from_value::<InteractionEntry>(json!({
            "drug1": "a",
            "drug2": "b",
            "severity": "severe",
            "description": "x"
        }));
        assert!(unknown.unwrap_err().to_string().contains("severe"));
    }

    #[test]
    fn unknown_severity_is_a_malformed_entry() {
        match "severe".parse::<InteractionSeverity>() {
            Err(SafetyError::MalformedEntry { reason }) => assert!(reason.contains("severe")),
            other => panic!("expected MalformedEntry, got {:?}", other),
        }
    }

    // ── Wire format ──────────────────────────────────────────────────────────

    #[test]
    fn interaction_entry_uses_store_column_names() {
        let entry: InteractionEntry = serde_json::from_value(json!({
            "drug1": "warfarin",
            "drug2": "aspirin",
            "severity": "major",
            "description": "Increased risk of bleeding"
        }))
        .unwrap();

        assert_eq!(entry.drug_a, "warfarin");
        assert_eq!(entry.drug_b, "aspirin");
        assert_eq!(entry.severity, InteractionSeverity::Major);
        assert!(entry.mechanism.is_empty());
    }

    #[test]
    fn minimal_draft_decodes_from_camel_case() {
        let draft: DraftRecommendation = serde_json::from_value(json!({
            "overallRiskLevel": "medium",
            "riskScore": 40,
            "primaryRecommendation": { "medication": "Amoxicillin 500mg" }
        }))
        .unwrap();

        assert_eq!(draft.overall_risk_level, RiskLevel::Medium);
        assert_eq!(draft.risk_score, 40.0);
        assert_eq!(draft.proposed_medication(), Some("Amoxicillin 500mg"));
        assert!(draft.drug_interactions.is_empty());

        let back = serde_json::to_value(&draft).unwrap();
        assert_eq!(back["overallRiskLevel"], "medium");
        assert_eq!(back["riskScore"].to_string(), "40");
        assert_eq!(back["primaryRecommendation"]["medication"], "Amoxicillin 500mg");
    }

    #[test]
    fn fractional_scores_keep_their_precision() {
        let draft: DraftRecommendation = serde_json::from_value(json!({
            "overallRiskLevel": "low",
            "riskScore": 25.5,
            "primaryRecommendation": { "medication": "Amoxicillin", "confidenceScore": 82.5 }
        }))
        .unwrap();

        assert_eq!(draft.risk_score, 25.5);
        assert_eq!(draft.primary_recommendation.confidence_score, 82.5);

        let back = serde_json::to_value(&draft).unwrap();
        assert_eq!(back["riskScore"], 25.5);
        assert_eq!(back["primaryRecommendation"]["confidenceScore"], 82.5);
    }

    #[test]
    fn minimal_draft_clamps_its_score() {
        assert_eq!(DraftRecommendation::minimal("x", RiskLevel::Low, 140.0).risk_score, 100.0);
        assert_eq!(DraftRecommendation::minimal("x", RiskLevel::Low, -5.0).risk_score, 0.0);
    }

    #[test]
    fn blank_medication_counts_as_missing() {
        let mut draft = DraftRecommendation::minimal("   ", RiskLevel::Low, 10.0);
        assert_eq!(draft.proposed_medication(), None);

        draft.primary_recommendation.medication = None;
        assert_eq!(draft.proposed_medication(), None);
    }

    #[test]
    fn patient_profile_defaults_to_empty_lists() {
        let profile: PatientProfile = serde_json::from_value(json!({})).unwrap();
        assert!(profile.is_empty());
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_knowledge_fetch_display() {
        let err = SafetyError::KnowledgeFetch {
            source_name: "remote".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("remote"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn error_config_error_display() {
        let err = SafetyError::ConfigError {
            reason: "timeout_secs must be positive".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
    }
}
