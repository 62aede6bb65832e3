use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const ART_TYPES: [&str; 3] = ["Building", "Sculpture", "Artwork"];
pub const MEDIUM_LITERALS: [&str; 2] = ["Painting", "Sketch"];
pub const FOCUS_LITERALS: [&str; 3] = ["Artstyle", "Emotion", "Specific Object"];

pub const PAINTING_QUESTIONS: [&str; 10] = [
    "How can I improve the composition of my painting?",
    "How can I improve the colors in my painting?",
    "How can I improve my brushwork?",
    "How can I make the lighting in my painting more convincing?",
    "How can I create more depth in my painting?",
    "How can I convey more emotion in my painting?",
    "How can I paint more realistic figures?",
    "How can I improve the background of my painting?",
    "What style does my painting resemble and how can I develop it?",
    "Is my painting finished, and what should I work on next?",
];

pub const SKETCH_QUESTIONS: [&str; 11] = [
    "How can I improve the proportions in my sketch?",
    "How can I improve my line quality?",
    "How can I improve the shading in my sketch?",
    "How can I draw more accurate perspective?",
    "How can I improve the anatomy in my figure drawing?",
    "How can I capture more movement and gesture?",
    "How can I add more texture and detail to my sketch?",
    "How can I improve the composition of my sketch?",
    "How can I draw better facial features and expressions?",
    "How can I make my sketch look more three-dimensional?",
    "How can I turn my sketch into a finished piece?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtMedium {
    Painting,
    Sketch,
}

impl ArtMedium {
    pub fn literal(self) -> &'static str {
        MEDIUM_LITERALS[self as usize]
    }

    pub fn from_literal(literal: &str) -> Option<Self> {
        [Self::Painting, Self::Sketch]
            .into_iter()
            .find(|m| m.literal() == literal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackFocus {
    ArtStyle,
    Emotion,
    SpecificObject,
}

impl FeedbackFocus {
    pub fn literal(self) -> &'static str {
        FOCUS_LITERALS[self as usize]
    }

    pub fn from_literal(literal: &str) -> Option<Self> {
        [Self::ArtStyle, Self::Emotion, Self::SpecificObject]
            .into_iter()
            .find(|f| f.literal() == literal)
    }
}

/// Painting question archetypes, A through J
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaintingIntent {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
}

impl PaintingIntent {
    pub const ALL: [Self; 10] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
    ];

    pub fn question(self) -> &'static str {
        PAINTING_QUESTIONS[self as usize]
    }

    pub fn from_question(literal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.question() == literal)
    }
}

/// Sketch question archetypes, K through U
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SketchIntent {
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
}

impl SketchIntent {
    pub const ALL: [Self; 11] = [
        Self::K,
        Self::L,
        Self::M,
        Self::N,
        Self::O,
        Self::P,
        Self::Q,
        Self::R,
        Self::S,
        Self::T,
        Self::U,
    ];

    pub fn question(self) -> &'static str {
        SKETCH_QUESTIONS[self as usize]
    }

    pub fn from_question(literal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.question() == literal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentCode {
    Painting(PaintingIntent),
    Sketch(SketchIntent),
}

/// Result of classifying the first message of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Archetype { medium: ArtMedium, code: IntentCode },
    Focus { focus: FeedbackFocus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtType {
    Building,
    Sculpture,
    Artwork,
}

/// Lenient year parsing: the model sometimes answers "1504", 1504.0 or "unknown"
fn deserialize_flexible_year<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleInt {
        Int(i64),
        Float(f64),
        String(String),
        Null(()),
    }

    let value = FlexibleInt::deserialize(deserializer)?;
    Ok(match value {
        FlexibleInt::Int(i) => Some(i),
        FlexibleInt::Float(f) => Some(f as i64),
        FlexibleInt::String(s) => s.trim().parse::<i64>().ok(),
        FlexibleInt::Null(()) => None,
    })
}

/// Structured answer of the single-shot analysis path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(rename = "type")]
    pub art_type: ArtType,
    pub title: String,
    pub creator: String,
    pub style: String,
    #[serde(deserialize_with = "deserialize_flexible_year", default)]
    pub year: Option<i64>,
    pub era: String,
    pub cultural_origin: String,
    pub provenance: String,
    pub contextual_meaning: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// What the user sent: some text and maybe an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<ImageData>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: ImageData) -> Self {
        Self {
            text: text.into(),
            image: Some(image),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub utterance: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(speaker: Speaker, utterance: impl Into<String>) -> Self {
        Self {
            speaker,
            utterance: utterance.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Instruction and schema fixed for a session after its first turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedIntent {
    pub instruction: String,
    pub schema: String,
    /// `None` when classification failed and the generic reply was pinned
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Fresh,
    IntentPinned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(default)]
    pub turns: Vec<ChatTurn>,
    #[serde(default)]
    pub pinned: Option<PinnedIntent>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            turns: Vec::new(),
            pinned: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.pinned.is_some() {
            SessionState::IntentPinned
        } else {
            SessionState::Fresh
        }
    }

    /// Prior turns rendered as plain conversational context.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::User => format!("User: {}", turn.utterance),
                Speaker::Bot => format!("Bot: {}", turn.utterance),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// Gemini content container, shared by requests and responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

// Variant order matters for untagged decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

// Gemini generateContent request format
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

// Gemini generateContent response format
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
    }
}
