pub mod analysis;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod intent;
pub mod models;
pub mod orchestrator;
pub mod redis;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod transport;
pub mod uploads;

use std::sync::Arc;

use crate::analysis::Analyst;
use crate::config::{ClassificationScheme, Config};
use crate::error::Result;
use crate::gateway::{Inference, InferenceGateway, StructuredResult};
use crate::intent::{GeminiIntent, IntentClassifier};
use crate::models::{AnalysisRecord, ChatSession, ImageData, Prompt};
use crate::orchestrator::{Orchestrator, TurnFailure};
use crate::transport::{GeminiTransport, Transport};

pub struct ArtService {
    analyst: Analyst,
    orchestrator: Orchestrator,
}

impl ArtService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(GeminiTransport::new(&cfg.gemini)?);
        Ok(Self::with_transport(transport, cfg.intent.scheme))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, scheme: ClassificationScheme) -> Self {
        let gateway: Arc<dyn Inference> = Arc::new(InferenceGateway::new(transport));
        let classifier: Arc<dyn IntentClassifier> =
            Arc::new(GeminiIntent::new(Arc::clone(&gateway), scheme));

        Self {
            analyst: Analyst::new(Arc::clone(&gateway)),
            orchestrator: Orchestrator::new(classifier, gateway),
        }
    }

    pub async fn analyze(&self, image: ImageData) -> Result<AnalysisRecord> {
        self.analyst.analyze_image(image).await
    }

    pub async fn respond(
        &self,
        session: &mut ChatSession,
        prompt: Prompt,
    ) -> std::result::Result<StructuredResult, TurnFailure> {
        self.orchestrator.respond(session, prompt).await
    }
}
