//! Candidate fallback.
//!
//! One prompt, one schema, an ordered list of model ids. Each candidate gets
//! exactly one attempt, bounded by a timeout, strictly in order. The first
//! output that passes schema validation wins; if none does, only the last
//! candidate's failure is reported.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use symcheck_core::models::token_count::TokenUsage;
use symcheck_core::schema::OutputSchema;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{BedrockError, CandidateError, GenerationFailed};
use crate::prompt::Prompt;
use crate::provider::{GenerationRequest, SamplingParams, StructuredGenerator};

pub const DEFAULT_CANDIDATE_TIMEOUT: Duration = Duration::from_secs(30);

/// The accepted result of a generation, before it is returned to the caller.
#[derive(Debug, Clone)]
pub struct GenerationOutcome<T> {
    pub transaction_id: Uuid,
    pub model_id: String,
    /// 1-based position of the winning candidate.
    pub attempts: usize,
    pub usage: TokenUsage,
    pub output: T,
}

pub struct Orchestrator {
    generator: Arc<dyn StructuredGenerator>,
    candidates: Vec<String>,
    sampling: SamplingParams,
    candidate_timeout: Duration,
}

impl Orchestrator {
    /// Fails if `candidates` is empty.
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        candidates: Vec<String>,
    ) -> Result<Self, BedrockError> {
        if candidates.is_empty() {
            return Err(BedrockError::Config(
                "at least one candidate model is required".to_string(),
            ));
        }
        Ok(Self {
            generator,
            candidates,
            sampling: SamplingParams::default(),
            candidate_timeout: DEFAULT_CANDIDATE_TIMEOUT,
        })
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_candidate_timeout(mut self, timeout: Duration) -> Self {
        self.candidate_timeout = timeout;
        self
    }

    /// Try each candidate in order until one returns output that `schema`
    /// accepts.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        prompt: &Prompt,
        schema: &OutputSchema,
    ) -> Result<GenerationOutcome<T>, GenerationFailed> {
        let transaction_id = Uuid::new_v4();
        let request = GenerationRequest {
            system: &prompt.system,
            user: &prompt.user,
            schema,
            sampling: self.sampling,
        };

        let mut last_failure = None;

        for (index, model_id) in self.candidates.iter().enumerate() {
            let attempt = index + 1;
            info!(transaction_id = %transaction_id, model_id = %model_id, attempt, "starting generation");

            match self.attempt::<T>(model_id, &request, schema).await {
                Ok((output, usage)) => {
                    info!(
                        transaction_id = %transaction_id,
                        model_id = %model_id,
                        attempt,
                        input_tokens = usage.tokens.input,
                        output_tokens = usage.tokens.output,
                        cost_usd = usage.cost_usd,
                        "generation complete"
                    );
                    return Ok(GenerationOutcome {
                        transaction_id,
                        model_id: model_id.clone(),
                        attempts: attempt,
                        usage,
                        output,
                    });
                }
                Err(e) => {
                    warn!(
                        transaction_id = %transaction_id,
                        model_id = %model_id,
                        attempt,
                        error = %e,
                        "candidate model failed"
                    );
                    last_failure = Some((model_id.clone(), e));
                }
            }
        }

        let (model_id, last) = last_failure.unwrap_or_else(|| {
            (
                String::new(),
                BedrockError::Config("no candidate models configured".to_string()).into(),
            )
        });

        error!(
            transaction_id = %transaction_id,
            attempts = self.candidates.len(),
            error = %last,
            "all candidate models failed"
        );

        Err(GenerationFailed {
            attempts: self.candidates.len(),
            model_id,
            last,
        })
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        model_id: &str,
        request: &GenerationRequest<'_>,
        schema: &OutputSchema,
    ) -> Result<(T, TokenUsage), CandidateError> {
        let raw = tokio::time::timeout(
            self.candidate_timeout,
            self.generator.generate(model_id, request),
        )
        .await
        .map_err(|_| CandidateError::Timeout(self.candidate_timeout))??;

        let output = schema.parse_str(&raw.text)?;
        Ok((output, raw.usage))
    }
}
