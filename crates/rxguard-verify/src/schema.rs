//! JSON Schema documents for the two inputs the engine accepts.
//!
//! The draft schema follows the shape the reasoning collaborator is asked to
//! produce. Only the fields the engine reads are required; everything else is
//! type-checked when present. `primaryRecommendation.medication` is
//! deliberately optional so a draft without one still reaches the engine and
//! is passed through unchanged.

use serde_json::{json, Value};

fn score() -> Value {
    json!({ "type": "number", "minimum": 0, "maximum": 100 })
}

fn strings() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn drug_interaction() -> Value {
    json!({
        "type": "object",
        "properties": {
            "drug1": { "type": "string" },
            "drug2": { "type": "string" },
            "severity": { "enum": ["minor", "moderate", "major", "contraindicated"] },
            "description": { "type": "string" },
            "recommendation": { "type": "string" }
        },
        "required": ["drug1", "drug2", "severity", "description", "recommendation"]
    })
}

fn contraindication() -> Value {
    json!({
        "type": "object",
        "properties": {
            "medication": { "type": "string" },
            "condition": { "type": "string" },
            "severity": { "enum": ["relative", "absolute"] },
            "description": { "type": "string" },
            "recommendation": { "type": "string" }
        },
        "required": ["medication", "condition", "severity", "description", "recommendation"]
    })
}

fn treatment() -> Value {
    json!({
        "type": "object",
        "properties": {
            "medication": { "type": "string" },
            "dosage": { "type": "string" },
            "frequency": { "type": "string" },
            "duration": { "type": "string" },
            "route": { "type": "string" },
            "confidenceScore": score(),
            "rationale": { "type": "string" },
            "monitoringRequired": strings(),
            "warnings": strings()
        }
    })
}

fn alternative() -> Value {
    json!({
        "type": "object",
        "properties": {
            "medication": { "type": "string" },
            "dosage": { "type": "string" },
            "rationale": { "type": "string" },
            "confidenceScore": score(),
            "considerations": strings()
        },
        "required": ["medication"]
    })
}

fn risk_factor() -> Value {
    json!({
        "type": "object",
        "properties": {
            "factor": { "type": "string" },
            "severity": { "enum": ["low", "medium", "high"] },
            "description": { "type": "string" },
            "mitigation": { "type": "string" }
        },
        "required": ["factor", "severity"]
    })
}

/// Schema for a `DraftRecommendation` (and so for an `EnrichedAnalysis`).
pub fn draft_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "DraftRecommendation",
        "type": "object",
        "properties": {
            "overallRiskLevel": { "enum": ["low", "medium", "high", "critical"] },
            "riskScore": score(),
            "summaryAssessment": { "type": "string" },
            "primaryRecommendation": treatment(),
            "alternativeTreatments": { "type": "array", "items": alternative() },
            "drugInteractions": { "type": "array", "items": drug_interaction() },
            "contraindications": { "type": "array", "items": contraindication() },
            "riskFactors": { "type": "array", "items": risk_factor() },
            "lifestyleRecommendations": strings(),
            "followUpRecommendations": strings(),
            "labTestsRecommended": strings(),
            "analysisTimestamp": { "type": "string" },
            "modelVersion": { "type": "string" },
            "disclaimer": { "type": "string" }
        },
        "required": [
            "overallRiskLevel",
            "riskScore",
            "primaryRecommendation",
            "drugInteractions",
            "contraindications"
        ]
    })
}

/// Schema for a `PatientProfile`. Every list may be absent or empty.
pub fn patient_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "PatientProfile",
        "type": "object",
        "properties": {
            "currentMedications": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "dosage": { "type": "string" },
                        "frequency": { "type": "string" },
                        "duration": { "type": "string" }
                    },
                    "required": ["name"]
                }
            },
            "conditions": strings(),
            "allergies": strings()
        }
    })
}
