//! Prompt construction for the diagnose request.
//!
//! Everything here is a pure function of the patient input and the schema
//! description: the same input always yields byte-identical instructions.

use serde::Serialize;
use symcheck_core::models::patient::PatientInput;
use symcheck_core::schema::OutputSchema;

/// Safety policy sent as the system instruction. Joined with single spaces.
const SYSTEM_RULES: &[&str] = &[
    "You are an AI Medical Advice Assistant.",
    "Goal: produce 3-5 POSSIBLE causes (non-diagnostic) with safe self-care and OTC advice.",
    "Never present a cause as a definitive diagnosis.",
    "Return ONLY valid JSON that matches the schema. No markdown, no extra text.",
    "DO NOT suggest prescription-only drugs or antibiotics.",
    "OTC guidance must be generic and safe (e.g., \"as directed on the label\"); avoid specific dosing for children unless clearly safe.",
    "Respect allergies/medical history; avoid contraindications (e.g., avoid NSAIDs if peptic ulcer/CKD/anticoagulants; avoid loperamide if bloody diarrhea/fever).",
    "Include precautions and when follow-up is appropriate; keep language concise.",
    "Prefer common conditions unless red flags strongly suggest otherwise.",
];

/// Formatting rules placed between the schema description and the payload.
const OUTPUT_RULES: &[&str] = &[
    "- Use only OTC options when listing medications; phrase dosing broadly (e.g., \"as directed on the label\").",
    "- Always include recommendations (hydration, rest, diet, local care, etc.) and precautions for every entry.",
    "- If symptoms are potentially serious, reflect that urgency in precautions and follow_up.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// The patient fields as the model sees them.
#[derive(Serialize)]
struct PatientPayload<'a> {
    #[serde(rename = "SYMPTOMS_TEXT")]
    symptoms: &'a str,
    #[serde(rename = "AGE_GROUP")]
    age_group: &'a str,
    #[serde(rename = "SEVERITY")]
    severity: &'a str,
    #[serde(rename = "DURATION")]
    duration: &'a str,
    #[serde(rename = "HISTORY_ALLERGIES")]
    history: &'a str,
}

pub fn system_instruction() -> String {
    SYSTEM_RULES.join(" ")
}

/// Build the system and user instructions for `input`.
///
/// `schema_description` is embedded verbatim on the line after the schema
/// header, followed by the output rules and the patient payload.
pub fn build_prompt(
    input: &PatientInput,
    schema_description: &str,
) -> Result<Prompt, serde_json::Error> {
    let payload = PatientPayload {
        symptoms: &input.symptoms,
        age_group: input.age_group.as_str(),
        severity: input.severity.as_str(),
        duration: &input.duration,
        history: &input.medical_history,
    };
    let payload = serde_json::to_string(&payload)?;

    let mut lines: Vec<&str> = Vec::with_capacity(OUTPUT_RULES.len() + 6);
    lines.push("Output JSON schema (informal, keys ending in ? are optional):");
    lines.push(schema_description);
    lines.push("Rules:");
    lines.extend_from_slice(OUTPUT_RULES);
    lines.push("Patient input JSON:");
    lines.push(&payload);

    Ok(Prompt {
        system: system_instruction(),
        user: lines.join("\n"),
    })
}

/// [`build_prompt`] against the diagnosis result contract.
pub fn diagnosis_prompt(input: &PatientInput) -> Result<Prompt, serde_json::Error> {
    build_prompt(input, &OutputSchema::diagnosis_result().describe())
}
