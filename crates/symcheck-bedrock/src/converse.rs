//! Structured generation through the Bedrock Converse API.
//!
//! The output contract is sent as the input schema of a single tool and the
//! model is forced to call that tool, so the answer arrives as a `ToolUse`
//! block rather than prose. If a model replies with text anyway, the text is
//! passed through (minus any markdown code fence) and left for schema
//! validation to accept or reject.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SpecificToolChoice,
    SystemContentBlock, Tool, ToolChoice, ToolConfiguration, ToolInputSchema, ToolSpecification,
};
use tracing::debug;

use crate::document::{document_to_json, json_to_document};
use crate::error::BedrockError;
use crate::provider::{GenerationRequest, RawGeneration, StructuredGenerator};
use crate::tokens;

/// Name of the tool the model is forced to call.
pub const OUTPUT_TOOL_NAME: &str = "submit_structured_output";

const OUTPUT_TOOL_DESCRIPTION: &str = "\
Submit the complete answer. The input must match the schema exactly; \
do not omit required fields.";

#[derive(Clone)]
pub struct BedrockGenerator {
    client: Client,
}

impl BedrockGenerator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_region(region: &str) -> Self {
        Self::new(crate::client::build_client_with_region(region).await)
    }
}

#[async_trait]
impl StructuredGenerator for BedrockGenerator {
    async fn generate(
        &self,
        model_id: &str,
        request: &GenerationRequest<'_>,
    ) -> Result<RawGeneration, BedrockError> {
        let tool_config = output_tool_config(request)?;

        let inference = InferenceConfiguration::builder()
            .temperature(request.sampling.temperature)
            .max_tokens(i32::try_from(request.sampling.max_output_tokens).unwrap_or(i32::MAX))
            .build();

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request.user.to_string()))
            .build()
            .map_err(|e| BedrockError::Invocation(e.to_string()))?;

        let response = self
            .client
            .converse()
            .model_id(model_id)
            .system(SystemContentBlock::Text(request.system.to_string()))
            .messages(message)
            .inference_config(inference)
            .tool_config(tool_config)
            .send()
            .await
            .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

        let text = structured_output(output_message.content())?;

        let token_count = response
            .usage()
            .map(tokens::extract_token_usage)
            .unwrap_or_default();

        debug!(
            model_id,
            stop_reason = ?response.stop_reason(),
            output_len = text.len(),
            "converse call returned"
        );

        Ok(RawGeneration {
            text,
            usage: tokens::price_usage(model_id, token_count),
        })
    }
}

fn output_tool_config(request: &GenerationRequest<'_>) -> Result<ToolConfiguration, BedrockError> {
    let spec = ToolSpecification::builder()
        .name(OUTPUT_TOOL_NAME)
        .description(OUTPUT_TOOL_DESCRIPTION)
        .input_schema(ToolInputSchema::Json(json_to_document(
            &request.schema.json_schema(),
        )))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    let choice = SpecificToolChoice::builder()
        .name(OUTPUT_TOOL_NAME)
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    ToolConfiguration::builder()
        .tools(Tool::ToolSpec(spec))
        .tool_choice(ToolChoice::Tool(choice))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))
}

/// Pull the structured answer out of the response content: the first tool
/// call's input if there is one, otherwise the concatenated text.
fn structured_output(blocks: &[ContentBlock]) -> Result<String, BedrockError> {
    let tool_input = blocks.iter().find_map(|block| match block {
        ContentBlock::ToolUse(tool_use) => Some(tool_use.input()),
        _ => None,
    });
    if let Some(input) = tool_input {
        return Ok(serde_json::to_string(&document_to_json(input))?);
    }

    let text = blocks
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(text) = block {
                Some(text.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(BedrockError::ResponseParse(
            "response contained neither tool input nor text".to_string(),
        ));
    }

    Ok(strip_code_fence(&text).to_string())
}

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````), if
/// present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}
