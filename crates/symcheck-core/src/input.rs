//! Request body validation.
//!
//! Turns an arbitrary JSON value into a [`PatientInput`], or reports the first
//! constraint it violates. Nothing downstream ever sees a partially valid
//! input.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::patient::{AgeGroup, PatientInput, Severity};

/// Wire names of the request body fields.
pub mod field {
    pub const SYMPTOMS: &str = "symptoms";
    pub const AGE: &str = "age";
    pub const SEVERITY: &str = "severity";
    pub const DURATION: &str = "duration";
    pub const MEDICAL_HISTORY: &str = "medicalHistory";
}

/// Validate a decoded request body.
///
/// `symptoms` is required and must be non-empty after trimming; `age` and
/// `severity` must be one of their enumerated values; `duration` and
/// `medicalHistory` default to the empty string when absent but must be
/// strings when present.
pub fn validate_input(value: &Value) -> Result<PatientInput, ValidationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValidationError::new("body", "expected a JSON object"))?;

    let symptoms = required_str(obj, field::SYMPTOMS)?.trim();
    if symptoms.is_empty() {
        return Err(ValidationError::new(field::SYMPTOMS, "must not be empty"));
    }

    let age = required_str(obj, field::AGE)?;
    let age_group = AgeGroup::parse(age).ok_or_else(|| {
        one_of(field::AGE, AgeGroup::ALL.iter().map(AgeGroup::as_str))
    })?;

    let severity = required_str(obj, field::SEVERITY)?;
    let severity = Severity::parse(severity).ok_or_else(|| {
        one_of(field::SEVERITY, Severity::ALL.iter().map(Severity::as_str))
    })?;

    let duration = optional_str(obj, field::DURATION)?;
    let medical_history = optional_str(obj, field::MEDICAL_HISTORY)?;

    Ok(PatientInput {
        symptoms: symptoms.to_string(),
        age_group,
        severity,
        duration,
        medical_history,
    })
}

fn required_str<'a>(obj: &'a Map<String, Value>, name: &str) -> Result<&'a str, ValidationError> {
    match obj.get(name) {
        None => Err(ValidationError::new(name, "required")),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(type_mismatch(name, other)),
    }
}

fn optional_str(obj: &Map<String, Value>, name: &str) -> Result<String, ValidationError> {
    match obj.get(name) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_mismatch(name, other)),
    }
}

fn type_mismatch(name: &str, found: &Value) -> ValidationError {
    ValidationError::new(name, format!("expected a string, got {}", json_type(found)))
}

fn one_of<'a>(name: &str, allowed: impl Iterator<Item = &'a str>) -> ValidationError {
    let allowed: Vec<&str> = allowed.collect();
    ValidationError::new(name, format!("expected one of {}", allowed.join(", ")))
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
