//! The one capability the orchestrator needs from a model host: given
//! instructions and an output contract, produce raw structured output.

use async_trait::async_trait;
use symcheck_core::models::token_count::TokenUsage;
use symcheck_core::schema::OutputSchema;

use crate::error::BedrockError;

pub const DEFAULT_TEMPERATURE: f32 = 0.25;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 900;

/// Generation-level parameters shared by every candidate in a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub schema: &'a OutputSchema,
    pub sampling: SamplingParams,
}

/// Unvalidated model output. The caller owns schema validation.
#[derive(Debug, Clone)]
pub struct RawGeneration {
    pub text: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(
        &self,
        model_id: &str,
        request: &GenerationRequest<'_>,
    ) -> Result<RawGeneration, BedrockError>;
}
