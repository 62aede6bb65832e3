use serde::Serialize;
use std::sync::Arc;

use crate::error::{ArtLensError, ReasonCode};
use crate::gateway::{Inference, StructuredResult};
use crate::intent::IntentClassifier;
use crate::models::{ChatSession, ChatTurn, PinnedIntent, Prompt, Speaker};
use crate::resolver;
use crate::schema;

/// A turn that produced no reply. History is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnFailure {
    pub reason: ReasonCode,
    pub detail: String,
}

impl From<ArtLensError> for TurnFailure {
    fn from(e: ArtLensError) -> Self {
        Self {
            reason: e.reason(),
            detail: e.to_string(),
        }
    }
}

impl std::fmt::Display for TurnFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not generate a response ({:?}): {}", self.reason, self.detail)
    }
}

pub struct Orchestrator {
    classifier: Arc<dyn IntentClassifier>,
    gateway: Arc<dyn Inference>,
}

impl Orchestrator {
    pub fn new(classifier: Arc<dyn IntentClassifier>, gateway: Arc<dyn Inference>) -> Self {
        Self {
            classifier,
            gateway,
        }
    }

    /// Run one chat turn against `session`.
    pub async fn respond(
        &self,
        session: &mut ChatSession,
        prompt: Prompt,
    ) -> Result<StructuredResult, TurnFailure> {
        let pinned = self.pin(session, &prompt).await;
        let schema = schema::lookup(&pinned.schema)?;

        let transcript = session.transcript();
        let text = if transcript.is_empty() {
            prompt.text.clone()
        } else {
            format!("{}\n\nConversation so far:\n{}", prompt.text, transcript)
        };
        let request = Prompt {
            text,
            image: prompt.image,
        };

        match self
            .gateway
            .infer(&request, &pinned.instruction, schema)
            .await
        {
            Ok(record) => {
                let summary = serde_json::to_string(&record).map_err(ArtLensError::from)?;
                session.turns.push(ChatTurn::new(Speaker::User, prompt.text));
                session.turns.push(ChatTurn::new(Speaker::Bot, summary));
                tracing::info!(
                    session = %session.id,
                    turns = session.turns.len(),
                    "Chat turn completed with schema {}",
                    schema.name
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(session = %session.id, "Chat turn failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Pinned intent of the session, classifying on the first turn.
    async fn pin(&self, session: &mut ChatSession, prompt: &Prompt) -> PinnedIntent {
        if let Some(pinned) = &session.pinned {
            return pinned.clone();
        }

        let pinned = match self
            .classifier
            .classify(prompt)
            .await
            .and_then(resolver::resolve_intent)
        {
            Ok(pinned) => pinned,
            Err(e) => {
                tracing::warn!(
                    session = %session.id,
                    "Intent resolution failed, pinning generic reply: {}",
                    e
                );
                resolver::generic_reply()
            }
        };

        tracing::info!(session = %session.id, "Pinned schema {}", pinned.schema);
        session.pinned = Some(pinned.clone());
        pinned
    }
}
