use serde_json::Value;
use std::sync::Arc;

use crate::error::{ArtLensError, Result};
use crate::gateway::Inference;
use crate::models::{AnalysisRecord, ImageData, Prompt};
use crate::schema::{self, ANALYSIS};

pub const ANALYSIS_PROMPT: &str = "What can you tell me about this work of art?";

const ANALYSIS_INSTRUCTION: &str = "You are an app that analyses art in artworks, buildings and \
sculptures. Identify the type of art, the title of the work, the style used to create it, who \
the creator is, the year it was created, the name of the era it was created in, its \
provenance, its cultural and geographic origin, and the meaning or context of the work. If you \
do not know the answer for a field, use the value 'unknown'. Answer in the specified JSON \
format.";

pub struct Analyst {
    gateway: Arc<dyn Inference>,
}

impl Analyst {
    pub fn new(gateway: Arc<dyn Inference>) -> Self {
        Self { gateway }
    }

    /// Identify the work in `image`. One gateway call, no post-processing.
    pub async fn analyze_image(&self, image: ImageData) -> Result<AnalysisRecord> {
        tracing::info!(
            mime_type = %image.mime_type,
            bytes = image.bytes.len(),
            "Analyzing uploaded artwork"
        );

        let schema = schema::lookup(ANALYSIS)?;
        let record = self
            .gateway
            .infer(
                &Prompt::with_image(ANALYSIS_PROMPT, image),
                ANALYSIS_INSTRUCTION,
                schema,
            )
            .await?;

        serde_json::from_value(Value::Object(record)).map_err(|e| {
            ArtLensError::UpstreamParse(format!("Analysis does not fit the record: {e}"))
        })
    }
}
