//! Static mapping from a classified intent to the schema and instruction the
//! session is pinned to.

use crate::error::{ArtLensError, Result};
use crate::models::{
    ArtMedium, FeedbackFocus, Intent, IntentCode, PaintingIntent, PinnedIntent, SketchIntent,
};
use crate::schema::{
    self, FEEDBACK_ART_STYLE, FEEDBACK_EMOTION, FEEDBACK_SPECIFIC_OBJECT, OutputSchema, REPLY,
};

const PAINTING_FEEDBACK: &str = "You are a chatbot that gives detailed feedback on the user's \
painting for each field of the JSON response schema. Keep the tone soft and educational and \
give concrete suggestions for improvement.";

const SKETCH_FEEDBACK: &str = "You are a chatbot that gives detailed feedback on the user's \
sketch for each field of the JSON response schema. Keep the tone soft and educational and give \
concrete suggestions for improvement.";

const ART_STYLE_FEEDBACK: &str = "Give feedback on how to improve the given artwork towards the \
desired art style, for each category in the response schema.";

const EMOTION_FEEDBACK: &str = "Give feedback on how to convey, or better convey, the desired \
emotion in the given artwork, for each category in the response schema.";

const SPECIFIC_OBJECT_FEEDBACK: &str = "Give feedback on how to add, or better include, the \
desired object(s) in the given artwork, for each category in the response schema.";

/// Pinned when classification or resolution fails on the first turn
pub const GENERIC_FEEDBACK: &str = "You are a chatbot that gives detailed feedback only on the \
requested aspect of the user's art. Keep the tone soft and educational and give concrete \
suggestions for improvement. Use 200 words or less.";

static TABLE: &[(ArtMedium, IntentCode, &str)] = &[
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::A), "ResponseTemplateA"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::B), "ResponseTemplateB"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::C), "ResponseTemplateC"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::D), "ResponseTemplateD"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::E), "ResponseTemplateE"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::F), "ResponseTemplateF"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::G), "ResponseTemplateG"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::H), "ResponseTemplateH"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::I), "ResponseTemplateI"),
    (ArtMedium::Painting, IntentCode::Painting(PaintingIntent::J), "ResponseTemplateJ"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::K), "ResponseTemplate1"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::L), "ResponseTemplate2"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::M), "ResponseTemplate3"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::N), "ResponseTemplate4"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::O), "ResponseTemplate5"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::P), "ResponseTemplate6"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::Q), "ResponseTemplate7"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::R), "ResponseTemplate8"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::S), "ResponseTemplate9"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::T), "ResponseTemplate10"),
    (ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::U), "ResponseTemplate11"),
];

/// Schema for a (medium, archetype) pair. Pairs absent from the table are a miss.
pub fn resolve(medium: ArtMedium, code: IntentCode) -> Result<&'static OutputSchema> {
    let name = TABLE
        .iter()
        .find(|(m, c, _)| *m == medium && *c == code)
        .map(|(_, _, name)| *name)
        .ok_or_else(|| ArtLensError::not_found("intent", format!("{medium:?}/{code:?}")))?;
    schema::lookup(name)
}

pub fn resolve_focus(focus: FeedbackFocus) -> Result<&'static OutputSchema> {
    schema::lookup(match focus {
        FeedbackFocus::ArtStyle => FEEDBACK_ART_STYLE,
        FeedbackFocus::Emotion => FEEDBACK_EMOTION,
        FeedbackFocus::SpecificObject => FEEDBACK_SPECIFIC_OBJECT,
    })
}

/// Pair the resolved schema with the instruction that goes with it.
pub fn resolve_intent(intent: Intent) -> Result<PinnedIntent> {
    let (schema, instruction) = match intent {
        Intent::Archetype { medium, code } => {
            let instruction = match medium {
                ArtMedium::Painting => PAINTING_FEEDBACK,
                ArtMedium::Sketch => SKETCH_FEEDBACK,
            };
            (resolve(medium, code)?, instruction)
        }
        Intent::Focus { focus } => {
            let instruction = match focus {
                FeedbackFocus::ArtStyle => ART_STYLE_FEEDBACK,
                FeedbackFocus::Emotion => EMOTION_FEEDBACK,
                FeedbackFocus::SpecificObject => SPECIFIC_OBJECT_FEEDBACK,
            };
            (resolve_focus(focus)?, instruction)
        }
    };

    Ok(PinnedIntent {
        instruction: instruction.to_string(),
        schema: schema.name.to_string(),
        intent: Some(intent),
    })
}

pub fn generic_reply() -> PinnedIntent {
    PinnedIntent {
        instruction: GENERIC_FEEDBACK.to_string(),
        schema: REPLY.to_string(),
        intent: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_row_resolves() {
        for intent in PaintingIntent::ALL {
            let schema = resolve(ArtMedium::Painting, IntentCode::Painting(intent)).unwrap();
            assert!(schema.name.starts_with("ResponseTemplate"));
        }
        for intent in SketchIntent::ALL {
            let schema = resolve(ArtMedium::Sketch, IntentCode::Sketch(intent)).unwrap();
            assert!(schema.name.starts_with("ResponseTemplate"));
        }
        assert_eq!(TABLE.len(), 21);
    }

    #[test]
    fn test_resolved_templates_match_catalogue() {
        let a = resolve(ArtMedium::Painting, IntentCode::Painting(PaintingIntent::A)).unwrap();
        assert_eq!(a.name, "ResponseTemplateA");
        assert_eq!(
            a.field_names(),
            vec!["focal_point", "balance", "rule_of_thirds", "negative_space", "suggestions"]
        );

        let u = resolve(ArtMedium::Sketch, IntentCode::Sketch(SketchIntent::U)).unwrap();
        assert_eq!(u.name, "ResponseTemplate11");
        assert_eq!(
            u.field_names(),
            vec!["readiness", "refinement_areas", "medium_options", "next_steps", "suggestions"]
        );
    }

    #[test]
    fn test_cross_medium_pair_is_not_found() {
        let err = resolve(ArtMedium::Sketch, IntentCode::Painting(PaintingIntent::A)).unwrap_err();
        assert!(matches!(err, ArtLensError::NotFound { kind: "intent", .. }));
    }

    #[test]
    fn test_focus_resolves_to_feedback_schemas() {
        assert_eq!(resolve_focus(FeedbackFocus::ArtStyle).unwrap().name, FEEDBACK_ART_STYLE);
        assert_eq!(resolve_focus(FeedbackFocus::Emotion).unwrap().name, FEEDBACK_EMOTION);
        assert_eq!(
            resolve_focus(FeedbackFocus::SpecificObject).unwrap().fields.len(),
            10
        );
    }

    #[test]
    fn test_resolve_intent_pairs_instruction() {
        let pinned = resolve_intent(Intent::Archetype {
            medium: ArtMedium::Sketch,
            code: IntentCode::Sketch(SketchIntent::K),
        })
        .unwrap();
        assert_eq!(pinned.schema, "ResponseTemplate1");
        assert_eq!(pinned.instruction, SKETCH_FEEDBACK);

        let pinned = resolve_intent(Intent::Focus {
            focus: FeedbackFocus::Emotion,
        })
        .unwrap();
        assert_eq!(pinned.instruction, EMOTION_FEEDBACK);

        let fallback = generic_reply();
        assert_eq!(fallback.schema, REPLY);
        assert!(fallback.intent.is_none());
    }
}
