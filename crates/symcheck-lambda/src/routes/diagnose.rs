use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use serde_json::Value;

use symcheck_bedrock::prompt::build_prompt;
use symcheck_core::input::validate_input;
use symcheck_core::models::diagnosis::DiagnosisResult;
use symcheck_core::schema::OutputSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// Validate the patient input, run candidate fallback, and return the first
/// accepted diagnosis result.
///
/// The body is taken as raw bytes, and an unreadable or oversized body is
/// caught here, so every failure comes back in the `{error, detail}` shape.
pub async fn diagnose(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DiagnosisResult>, ApiError> {
    let body = body?;
    let value: Value = serde_json::from_slice(&body)?;
    let input = validate_input(&value)?;

    let schema = OutputSchema::diagnosis_result();
    let prompt = build_prompt(&input, &schema.describe())?;

    let outcome = state
        .orchestrator
        .generate::<DiagnosisResult>(&prompt, schema)
        .await?;

    tracing::info!(
        transaction_id = %outcome.transaction_id,
        model_id = %outcome.model_id,
        attempts = outcome.attempts,
        diagnoses = outcome.output.diagnoses.len(),
        "diagnose request served"
    );

    Ok(Json(outcome.output))
}
