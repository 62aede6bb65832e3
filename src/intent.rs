use async_trait::async_trait;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::config::ClassificationScheme;
use crate::error::{ArtLensError, Result};
use crate::gateway::{Inference, StructuredResult};
use crate::models::{
    ArtMedium, FeedbackFocus, Intent, IntentCode, PaintingIntent, Prompt, SketchIntent,
};
use crate::schema::{
    self, ART_MEDIUM_CHOICE, FEEDBACK_FOCUS_CHOICE, PAINTING_INTENT_CHOICE, SKETCH_INTENT_CHOICE,
};

const MEDIUM_INSTRUCTION: &str = "Decide whether the artwork the user is asking about is a \
painting (made with paint) or a sketch (made with pencil, charcoal or ink). Answer with the \
single enum value from the response schema that fits best.";

const FOCUS_INSTRUCTION: &str = "Decide which aspect of their art the user wants to work on. \
Answer with exactly one of the enum values in the response schema: 'Artstyle', 'Emotion' or \
'Specific Object'.";

const ARCHETYPE_INSTRUCTION: &str = "You compare how similar questions are. Compare the user's \
message to every enum value in the response schema and answer with the most similar one.";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, prompt: &Prompt) -> Result<Intent>;
}

/// Gemini-backed classifier for one [`ClassificationScheme`]
pub struct GeminiIntent {
    gateway: Arc<dyn Inference>,
    scheme: ClassificationScheme,
}

impl GeminiIntent {
    pub fn new(gateway: Arc<dyn Inference>, scheme: ClassificationScheme) -> Self {
        Self { gateway, scheme }
    }

    /// Painting or sketch. The image, when present, goes along with the text.
    pub async fn classify_medium(&self, prompt: &Prompt) -> Result<ArtMedium> {
        let schema = schema::lookup(ART_MEDIUM_CHOICE)?;
        let record = self.gateway.infer(prompt, MEDIUM_INSTRUCTION, schema).await?;
        let literal = literal_field(&record, "medium")?;

        ArtMedium::from_literal(literal)
            .ok_or_else(|| ArtLensError::UnrecognizedIntent(literal.to_string()))
    }

    pub async fn classify_focus(&self, text: &str) -> Result<FeedbackFocus> {
        let schema = schema::lookup(FEEDBACK_FOCUS_CHOICE)?;
        let record = self
            .gateway
            .infer(&Prompt::text(text), FOCUS_INSTRUCTION, schema)
            .await?;
        let literal = literal_field(&record, "focus")?;

        FeedbackFocus::from_literal(literal)
            .ok_or_else(|| ArtLensError::UnrecognizedIntent(literal.to_string()))
    }

    /// Which question archetype of `medium` the text is closest to.
    pub async fn classify_archetype(&self, medium: ArtMedium, text: &str) -> Result<IntentCode> {
        let schema_name = match medium {
            ArtMedium::Painting => PAINTING_INTENT_CHOICE,
            ArtMedium::Sketch => SKETCH_INTENT_CHOICE,
        };
        let schema = schema::lookup(schema_name)?;
        let record = self
            .gateway
            .infer(&Prompt::text(text), ARCHETYPE_INSTRUCTION, schema)
            .await?;
        let literal = literal_field(&record, "intent")?;

        let code = match medium {
            ArtMedium::Painting => PaintingIntent::from_question(literal).map(IntentCode::Painting),
            ArtMedium::Sketch => SketchIntent::from_question(literal).map(IntentCode::Sketch),
        };
        code.ok_or_else(|| ArtLensError::UnrecognizedIntent(literal.to_string()))
    }
}

fn literal_field<'a>(record: &'a StructuredResult, field: &str) -> Result<&'a str> {
    record
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ArtLensError::UnrecognizedIntent(
                record
                    .get(field)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            )
        })
}

#[async_trait]
impl IntentClassifier for GeminiIntent {
    async fn classify(&self, prompt: &Prompt) -> Result<Intent> {
        tracing::info!("Classifying intent ({:?} scheme) for: {}", self.scheme, prompt.text);

        let intent = match self.scheme {
            ClassificationScheme::Medium => {
                let medium = self.classify_medium(prompt).await?;
                let code = self.classify_archetype(medium, &prompt.text).await?;
                Intent::Archetype { medium, code }
            }
            ClassificationScheme::Focus => Intent::Focus {
                focus: self.classify_focus(&prompt.text).await?,
            },
        };

        tracing::info!("Classified intent: {:?}", intent);
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use crate::gateway::MockInference;
    use crate::models::SKETCH_QUESTIONS;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StructuredResult {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_classify_medium_exact_literal() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .withf(|_, _, schema| schema.name == ART_MEDIUM_CHOICE)
            .times(1)
            .returning(|_, _, _| Ok(record(json!({"medium": "Sketch"}))));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Medium);
        let medium = classifier
            .classify_medium(&Prompt::text("How do I shade this?"))
            .await
            .unwrap();
        assert_eq!(medium, ArtMedium::Sketch);
    }

    #[tokio::test]
    async fn test_classify_medium_unknown_literal() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .returning(|_, _, _| Ok(record(json!({"medium": "Sculpture"}))));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Medium);
        let err = classifier
            .classify_medium(&Prompt::text("What about my statue?"))
            .await
            .unwrap_err();
        match err {
            ArtLensError::UnrecognizedIntent(literal) => assert_eq!(literal, "Sculpture"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_classify_medium_rejects_padded_literal() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .returning(|_, _, _| Ok(record(json!({"medium": "  Painting\n"}))));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Medium);
        let err = classifier
            .classify_medium(&Prompt::text("Is the varnish too thick?"))
            .await
            .unwrap_err();
        match err {
            ArtLensError::UnrecognizedIntent(literal) => assert_eq!(literal, "  Painting\n"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_classify_focus_literals() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .withf(|_, _, schema| schema.name == FEEDBACK_FOCUS_CHOICE)
            .returning(|_, _, _| Ok(record(json!({"focus": "Specific Object"}))));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Focus);
        let focus = classifier.classify_focus("I want a better cat").await.unwrap();
        assert_eq!(focus, FeedbackFocus::SpecificObject);
    }

    #[tokio::test]
    async fn test_classify_focus_wrong_case_is_unrecognized() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .returning(|_, _, _| Ok(record(json!({"focus": "emotion"}))));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Focus);
        let err = classifier.classify_focus("make it sadder").await.unwrap_err();
        assert!(matches!(err, ArtLensError::UnrecognizedIntent(_)));
    }

    #[tokio::test]
    async fn test_classify_medium_scheme_runs_two_steps() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .withf(|_, _, schema| schema.name == ART_MEDIUM_CHOICE)
            .times(1)
            .returning(|_, _, _| Ok(record(json!({"medium": "Sketch"}))));
        gateway
            .expect_infer()
            .withf(|prompt, _, schema| {
                schema.name == SKETCH_INTENT_CHOICE && prompt.image.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(record(json!({"intent": SKETCH_QUESTIONS[2]}))));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Medium);
        let intent = classifier
            .classify(&Prompt::text("my hatching looks flat"))
            .await
            .unwrap();
        assert_eq!(
            intent,
            Intent::Archetype {
                medium: ArtMedium::Sketch,
                code: IntentCode::Sketch(SketchIntent::M),
            }
        );
    }

    #[tokio::test]
    async fn test_archetype_from_other_medium_is_unrecognized() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .returning(|_, _, _| Ok(record(json!({"intent": SKETCH_QUESTIONS[0]}))));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Medium);
        let err = classifier
            .classify_archetype(ArtMedium::Painting, "proportions?")
            .await
            .unwrap_err();
        assert!(matches!(err, ArtLensError::UnrecognizedIntent(_)));
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let mut gateway = MockInference::new();
        gateway
            .expect_infer()
            .returning(|_, _, _| Err(InferenceError::NoCandidates.into()));

        let classifier = GeminiIntent::new(Arc::new(gateway), ClassificationScheme::Focus);
        let err = classifier.classify(&Prompt::text("hi")).await.unwrap_err();
        assert!(matches!(
            err,
            ArtLensError::Inference(InferenceError::NoCandidates)
        ));
    }
}
