//! Patient profile types handed over by the intake collaborator.

use serde::{Deserialize, Serialize};

/// One medication the patient is currently taking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    /// Free-text name, e.g. "Lisinopril 10mg". Only the first word is used
    /// for matching.
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl MedicationRecord {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
            duration: None,
        }
    }
}

/// The slice of a patient's record the safety engine reads.
///
/// Immutable once submitted. Every list may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default)]
    pub current_medications: Vec<MedicationRecord>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl PatientProfile {
    /// Names of all current medications, in intake order.
    pub fn medication_names(&self) -> impl Iterator<Item = &str> {
        self.current_medications.iter().map(|m| m.name.as_str())
    }

    /// True when there is nothing to cross-check.
    pub fn is_empty(&self) -> bool {
        self.current_medications.is_empty()
            && self.conditions.is_empty()
            && self.allergies.is_empty()
    }
}
