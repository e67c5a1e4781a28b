use std::time::Duration;

use symcheck_core::error::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BedrockError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a single candidate model did not produce an accepted result.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error(transparent)]
    Provider(#[from] BedrockError),

    #[error("model did not respond within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Every candidate failed. Only the last candidate's reason is kept.
#[derive(Debug, Error)]
#[error("all {attempts} candidate models failed; last ({model_id}): {last}")]
pub struct GenerationFailed {
    pub attempts: usize,
    pub model_id: String,
    pub last: CandidateError,
}
