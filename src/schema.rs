//! Static catalogue of the output shapes the remote model is asked to fill.
//!
//! Every schema is a flat record of scalar fields. The catalogue is fixed at
//! build time; [`lookup`] is the only way in.

use serde_json::{Map, Value, json};

use crate::error::{ArtLensError, Result};
use crate::models::{
    ART_TYPES, FOCUS_LITERALS, MEDIUM_LITERALS, PAINTING_QUESTIONS, SKETCH_QUESTIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    /// A string restricted to one of the given literals
    Enum(&'static [&'static str]),
}

impl FieldType {
    fn to_gemini(self) -> Value {
        match self {
            FieldType::String => json!({ "type": "STRING" }),
            FieldType::Integer => json!({ "type": "INTEGER" }),
            FieldType::Enum(literals) => json!({ "type": "STRING", "enum": literals }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::String,
    }
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Integer,
    }
}

const fn one_of(name: &'static str, literals: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Enum(literals),
    }
}

/// Named, ordered set of fields the model's JSON reply must contain
#[derive(Debug, PartialEq, Eq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl OutputSchema {
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Render as a Gemini `responseSchema` object.
    pub fn response_schema(&self) -> Value {
        let names = self.field_names();
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.ty.to_gemini()))
            .collect();

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": names,
            "propertyOrdering": names,
        })
    }

    /// Check that `record` carries exactly this schema's fields.
    pub fn check_fields(&self, record: &Map<String, Value>) -> std::result::Result<(), String> {
        let missing: Vec<&str> = self
            .fields
            .iter()
            .map(|f| f.name)
            .filter(|name| !record.contains_key(*name))
            .collect();
        let unexpected: Vec<&str> = record
            .keys()
            .map(String::as_str)
            .filter(|key| !self.fields.iter().any(|f| f.name == *key))
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "missing fields {missing:?}, unexpected fields {unexpected:?}"
            ))
        }
    }
}

pub const ANALYSIS: &str = "Analysis";
pub const REPLY: &str = "Reply";
pub const ART_MEDIUM_CHOICE: &str = "ArtMediumChoice";
pub const FEEDBACK_FOCUS_CHOICE: &str = "FeedbackFocusChoice";
pub const PAINTING_INTENT_CHOICE: &str = "PaintingIntentChoice";
pub const SKETCH_INTENT_CHOICE: &str = "SketchIntentChoice";
pub const FEEDBACK_ART_STYLE: &str = "FeedbackArtStyle";
pub const FEEDBACK_EMOTION: &str = "FeedbackEmotion";
pub const FEEDBACK_SPECIFIC_OBJECT: &str = "FeedbackSpecificObject";

static CATALOGUE: &[OutputSchema] = &[
    OutputSchema {
        name: ANALYSIS,
        fields: &[
            one_of("type", &ART_TYPES),
            text("title"),
            text("creator"),
            text("style"),
            int("year"),
            text("era"),
            text("culturalOrigin"),
            text("provenance"),
            text("contextualMeaning"),
        ],
    },
    OutputSchema {
        name: REPLY,
        fields: &[text("reply")],
    },
    OutputSchema {
        name: ART_MEDIUM_CHOICE,
        fields: &[one_of("medium", &MEDIUM_LITERALS)],
    },
    OutputSchema {
        name: FEEDBACK_FOCUS_CHOICE,
        fields: &[one_of("focus", &FOCUS_LITERALS)],
    },
    OutputSchema {
        name: PAINTING_INTENT_CHOICE,
        fields: &[one_of("intent", &PAINTING_QUESTIONS)],
    },
    OutputSchema {
        name: SKETCH_INTENT_CHOICE,
        fields: &[one_of("intent", &SKETCH_QUESTIONS)],
    },
    OutputSchema {
        name: FEEDBACK_ART_STYLE,
        fields: &[
            text("brushwork"),
            text("palette"),
            text("composition_structure"),
            text("light_shadow"),
            text("lines_shapes"),
            text("scale_proportion"),
        ],
    },
    OutputSchema {
        name: FEEDBACK_EMOTION,
        fields: &[
            text("color_palette"),
            text("brushwork_texture"),
            text("composition_framing"),
            text("lighting_shadow"),
            text("lines_shapes"),
            text("scale_proportion"),
            text("brushstroke_movement"),
        ],
    },
    OutputSchema {
        name: FEEDBACK_SPECIFIC_OBJECT,
        fields: &[
            text("proportion_anatomy"),
            text("perspective_depth"),
            text("line_quality"),
            text("lighting_shadows"),
            text("texture_detail"),
            text("composition_framing"),
            text("color"),
            text("mood_emotion"),
            text("flow_gesture"),
            text("overall_concept"),
        ],
    },
    // Painting archetypes
    OutputSchema {
        name: "ResponseTemplateA",
        fields: &[
            text("focal_point"),
            text("balance"),
            text("rule_of_thirds"),
            text("negative_space"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateB",
        fields: &[
            text("color_harmony"),
            text("saturation"),
            text("temperature"),
            text("value_contrast"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateC",
        fields: &[
            text("stroke_variety"),
            text("texture"),
            text("edge_control"),
            text("paint_application"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateD",
        fields: &[
            text("light_source"),
            text("shadows"),
            text("highlights"),
            text("reflected_light"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateE",
        fields: &[
            text("atmospheric_perspective"),
            text("linear_perspective"),
            text("overlapping"),
            text("scale"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateF",
        fields: &[
            text("mood"),
            text("color_emotion"),
            text("gesture"),
            text("symbolism"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateG",
        fields: &[
            text("proportion"),
            text("anatomy"),
            text("skin_tones"),
            text("pose"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateH",
        fields: &[
            text("subject_relation"),
            text("detail_level"),
            text("color_integration"),
            text("depth"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateI",
        fields: &[
            text("identified_style"),
            text("influences"),
            text("distinctive_traits"),
            text("development_steps"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplateJ",
        fields: &[
            text("strengths"),
            text("unresolved_areas"),
            text("next_steps"),
            int("completeness_score"),
            text("suggestions"),
        ],
    },
    // Sketch archetypes
    OutputSchema {
        name: "ResponseTemplate1",
        fields: &[
            text("proportions"),
            text("measurement"),
            text("alignment"),
            text("corrections"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate2",
        fields: &[
            text("line_weight"),
            text("confidence"),
            text("line_variety"),
            text("contour"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate3",
        fields: &[
            text("value_range"),
            text("hatching"),
            text("blending"),
            text("light_logic"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate4",
        fields: &[
            text("horizon_line"),
            text("vanishing_points"),
            text("foreshortening"),
            text("consistency"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate5",
        fields: &[
            text("skeletal_structure"),
            text("musculature"),
            text("joints"),
            text("landmarks"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate6",
        fields: &[
            text("line_of_action"),
            text("rhythm"),
            text("weight"),
            text("energy"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate7",
        fields: &[
            text("surface_texture"),
            text("detail_hierarchy"),
            text("mark_making"),
            text("focal_detail"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate8",
        fields: &[
            text("placement"),
            text("balance"),
            text("focal_point"),
            text("framing"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate9",
        fields: &[
            text("facial_proportions"),
            text("features"),
            text("expression"),
            text("likeness"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate10",
        fields: &[
            text("form"),
            text("cast_shadows"),
            text("edges"),
            text("volume"),
            text("suggestions"),
        ],
    },
    OutputSchema {
        name: "ResponseTemplate11",
        fields: &[
            text("readiness"),
            text("refinement_areas"),
            text("medium_options"),
            text("next_steps"),
            text("suggestions"),
        ],
    },
];

/// Find a schema by name.
pub fn lookup(name: &str) -> Result<&'static OutputSchema> {
    CATALOGUE
        .iter()
        .find(|schema| schema.name == name)
        .ok_or_else(|| ArtLensError::not_found("schema", name))
}
