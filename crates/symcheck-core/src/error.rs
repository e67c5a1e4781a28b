use thiserror::Error;

/// A request body that does not describe a well-formed patient input.
///
/// Only the first violated constraint is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Model output that cannot be accepted as a diagnosis result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("response is not valid JSON: {0}")]
    Syntax(String),

    #[error("response did not conform to expected schema at {path}: {message}")]
    Violation { path: String, message: String },
}
