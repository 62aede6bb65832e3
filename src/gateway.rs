use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::error::{ArtLensError, InferenceError, Result};
use crate::models::{Content, GenerateContentRequest, GenerationConfig, InlineData, Part, Prompt};
use crate::schema::OutputSchema;
use crate::transport::Transport;

/// JSON object whose keys are exactly the schema's field names
pub type StructuredResult = Map<String, Value>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Inference: Send + Sync {
    async fn infer(
        &self,
        prompt: &Prompt,
        instruction: &str,
        schema: &'static OutputSchema,
    ) -> Result<StructuredResult>;
}

pub struct InferenceGateway {
    tx: Arc<dyn Transport>,
}

impl InferenceGateway {
    pub fn new(tx: Arc<dyn Transport>) -> Self {
        Self { tx }
    }
}

pub fn build_request(
    prompt: &Prompt,
    instruction: &str,
    schema: &OutputSchema,
) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(image) = &prompt.image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: STANDARD.encode(&image.bytes),
            },
        });
    }
    parts.push(Part::Text {
        text: prompt.text.clone(),
    });

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: instruction.to_string(),
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: schema.response_schema(),
        },
    }
}

#[async_trait]
impl Inference for InferenceGateway {
    async fn infer(
        &self,
        prompt: &Prompt,
        instruction: &str,
        schema: &'static OutputSchema,
    ) -> Result<StructuredResult> {
        tracing::info!(
            schema = schema.name,
            with_image = prompt.image.is_some(),
            "Requesting structured output from Gemini"
        );

        let request = build_request(prompt, instruction, schema);
        let response = self.tx.generate(&request).await?;

        if response.candidates.is_empty() {
            return Err(InferenceError::NoCandidates.into());
        }

        let malformed = |reason: String| InferenceError::MalformedPayload {
            schema: schema.name.to_string(),
            reason,
        };

        let text = response
            .first_text()
            .ok_or_else(|| malformed("candidate carries no text part".to_string()))?;

        let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
            ArtLensError::UpstreamParse(format!("Candidate is not valid JSON: {e}. Raw: {text}"))
        })?;

        let record = match value {
            Value::Object(record) => record,
            other => {
                return Err(malformed(format!("expected a JSON object, got: {other}")).into());
            }
        };

        schema.check_fields(&record).map_err(malformed)?;
        Ok(record)
    }
}
