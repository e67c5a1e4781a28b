use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use symcheck_bedrock::error::GenerationFailed;
use symcheck_core::error::ValidationError;

pub const BAD_REQUEST_MESSAGE: &str = "Bad request or server error";
pub const UPSTREAM_MESSAGE: &str = "Model did not return valid JSON";

/// Every failure the diagnose endpoint can report.
#[derive(Debug)]
pub enum ApiError {
    /// The body decoded but is not a valid patient input.
    Validation(String),
    /// Anything else before generation, e.g. a body that is not JSON.
    Internal(String),
    /// Every candidate model failed; carries the last failure.
    Generation(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            ApiError::Validation(detail) => {
                tracing::warn!(%detail, "rejected patient input");
                (StatusCode::INTERNAL_SERVER_ERROR, BAD_REQUEST_MESSAGE, detail)
            }
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, BAD_REQUEST_MESSAGE, detail)
            }
            ApiError::Generation(detail) => {
                (StatusCode::BAD_GATEWAY, UPSTREAM_MESSAGE, detail)
            }
        };

        let body = ErrorBody {
            error: error.to_string(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<GenerationFailed> for ApiError {
    fn from(e: GenerationFailed) -> Self {
        ApiError::Generation(e.last.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(e: BytesRejection) -> Self {
        ApiError::Internal(e.body_text())
    }
}
