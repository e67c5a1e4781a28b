use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The structured output of a diagnose request: 3 to 5 possible causes.
///
/// Only ever constructed from model output that passed
/// [`crate::schema::OutputSchema::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiagnosisResult {
    pub diagnoses: Vec<Diagnosis>,
}

/// One possible (non-diagnostic) cause for the reported symptoms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Diagnosis {
    pub condition: String,
    /// The model's own severity label for this condition.
    pub severity: String,
    pub confidence: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub symptoms_analyzed: Option<Vec<String>>,
    /// Over-the-counter options only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub medications: Option<Vec<Medication>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub precautions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub follow_up: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub estimated_recovery_days: Option<i32>,
}

/// Dosing stays qualitative ("as directed on the label"), so every field is
/// free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub duration: String,
}
