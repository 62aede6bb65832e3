use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Failures of a single call to the remote model service
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Gemini request failed: {0}")]
    NetworkFailure(String),

    #[error("Gemini request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Gemini returned no candidates")]
    NoCandidates,

    #[error("Gemini payload does not match schema '{schema}': {reason}")]
    MalformedPayload { schema: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ArtLensError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Failed to decode Gemini response: {0}")]
    UpstreamParse(String),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("Unrecognized intent literal: {0}")]
    UnrecognizedIntent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Failed to create Redis pool: {0}")]
    PoolCreation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ArtLensError>;

/// Machine-readable cause attached to every user-visible failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    NotFound,
    UnrecognizedIntent,
    NetworkFailure,
    Timeout,
    NoCandidates,
    MalformedPayload,
    UpstreamParseError,
    Validation,
    SessionStore,
    Config,
    Internal,
}

impl ArtLensError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> ReasonCode {
        match self {
            Self::Inference(InferenceError::NetworkFailure(_)) => ReasonCode::NetworkFailure,
            Self::Inference(InferenceError::Timeout(_)) => ReasonCode::Timeout,
            Self::Inference(InferenceError::NoCandidates) => ReasonCode::NoCandidates,
            Self::Inference(InferenceError::MalformedPayload { .. }) => {
                ReasonCode::MalformedPayload
            }
            Self::UpstreamParse(_) => ReasonCode::UpstreamParseError,
            Self::NotFound { .. } => ReasonCode::NotFound,
            Self::UnrecognizedIntent(_) => ReasonCode::UnrecognizedIntent,
            Self::Config(_) => ReasonCode::Config,
            Self::Validation { .. } => ReasonCode::Validation,
            Self::Redis(_) | Self::Pool(_) | Self::PoolCreation(_) => ReasonCode::SessionStore,
            Self::Json(_) | Self::Io(_) | Self::Internal(_) => ReasonCode::Internal,
        }
    }
}
