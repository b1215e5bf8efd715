//! Built-in walk-throughs of the escalation rules.
//!
//! Each scenario builds a draft and a patient as JSON, sends both through the
//! schema boundary, enriches the draft against the embedded dataset and
//! prints what changed.

use std::sync::Arc;

use serde_json::{json, Value};

use rxguard_contracts::{analysis::RiskLevel, error::SafetyResult};
use rxguard_engine::{EnrichmentEngine, EnrichmentOutcome};
use rxguard_knowledge::KnowledgeBaseProvider;
use rxguard_verify::BoundaryVerifier;

struct Scenario {
    title: &'static str,
    draft: Value,
    patient: Value,
    expected: (RiskLevel, f64),
}

fn draft(medication: &str, level: &str, score: f64, interactions: Value) -> Value {
    json!({
        "overallRiskLevel": level,
        "riskScore": score,
        "primaryRecommendation": { "medication": medication },
        "drugInteractions": interactions,
        "contraindications": []
    })
}

fn reported(drug1: &str, drug2: &str, severity: &str) -> Value {
    json!({
        "drug1": drug1,
        "drug2": drug2,
        "severity": severity,
        "description": "reported by the draft",
        "recommendation": "monitor"
    })
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            title: "Warfarin patient, aspirin proposed (one major interaction)",
            draft: draft("Aspirin", "medium", 40.0, json!([])),
            patient: json!({ "currentMedications": [{ "name": "Warfarin 5mg" }] }),
            expected: (RiskLevel::Medium, 40.0),
        },
        Scenario {
            title: "Penicillin allergy, amoxicillin proposed",
            draft: draft("Amoxicillin", "low", 25.0, json!([])),
            patient: json!({ "allergies": ["penicillin"] }),
            expected: (RiskLevel::Critical, 90.0),
        },
        Scenario {
            title: "Fractional draft score, penicillin allergy",
            draft: draft("Amoxicillin 500mg", "low", 25.5, json!([])),
            patient: json!({ "allergies": ["Penicillin"] }),
            expected: (RiskLevel::Critical, 90.0),
        },
        Scenario {
            title: "Draft already reports two major interactions",
            draft: draft(
                "Paracetamol",
                "medium",
                55.0,
                json!([
                    reported("drug-a", "drug-b", "major"),
                    reported("drug-c", "drug-d", "major")
                ]),
            ),
            patient: json!({}),
            expected: (RiskLevel::High, 70.0),
        },
        Scenario {
            title: "Draft reports a contraindicated interaction",
            draft: draft(
                "Paracetamol",
                "low",
                30.0,
                json!([reported("drug-a", "drug-b", "contraindicated")]),
            ),
            patient: json!({}),
            expected: (RiskLevel::Critical, 90.0),
        },
        Scenario {
            title: "Empty patient profile, minimal draft",
            draft: draft("Amoxicillin", "low", 10.0, json!([])),
            patient: json!({}),
            expected: (RiskLevel::Low, 10.0),
        },
    ]
}

pub fn run_all() -> SafetyResult<()> {
    let verifier = BoundaryVerifier::new()?;
    let engine = EnrichmentEngine::new(Arc::new(KnowledgeBaseProvider::embedded_only()?));

    let mut mismatches = 0;
    for (index, scenario) in scenarios().into_iter().enumerate() {
        println!("=== Scenario {}: {} ===", index + 1, scenario.title);
        println!();

        let draft = verifier.parse_draft(&scenario.draft)?;
        let patient = verifier.parse_patient(&scenario.patient)?;
        let outcome = engine.run(draft, &patient);
        verifier.check_enriched(&outcome.analysis)?;

        print_outcome(&outcome);

        let actual = (outcome.analysis.overall_risk_level, outcome.analysis.risk_score);
        let matches = actual == scenario.expected;
        if !matches {
            mismatches += 1;
        }
        println!(
            "  Expected:               {} / {}  [{}]",
            scenario.expected.0,
            scenario.expected.1,
            if matches { "OK" } else { "MISMATCH" }
        );
        println!();
    }

    if mismatches == 0 {
        println!("All scenarios produced the expected risk.");
    } else {
        println!("{mismatches} scenario(s) did not produce the expected risk.");
    }
    Ok(())
}

fn print_outcome(outcome: &EnrichmentOutcome) {
    let report = &outcome.report;

    println!(
        "  Risk before:            {} / {}",
        report.risk_before.level, report.risk_before.score
    );
    for finding in &report.appended_interactions {
        println!(
            "  + Interaction:          {} + {} ({})",
            finding.drug1, finding.drug2, finding.severity
        );
    }
    for finding in &report.appended_contraindications {
        println!(
            "  + Contraindication:     {} / {} ({})",
            finding.medication, finding.condition, finding.severity
        );
    }
    for escalation in &report.escalations {
        println!(
            "  ^ Escalation:           {} -> {} ({})",
            escalation.from_level, escalation.to_level, escalation.reason
        );
    }
    println!(
        "  Risk after:             {} / {}",
        report.risk_after.level, report.risk_after.score
    );
}
