/// HTTP handlers for the artlens web endpoints
pub mod analyze;
pub mod chat;

#[cfg(test)]
mod test_handlers;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::ArtService;
use crate::error::{ArtLensError, ReasonCode};
use crate::orchestrator::TurnFailure;
use crate::session::SessionStore;
use crate::uploads::UploadStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ArtService>,
    pub sessions: Arc<dyn SessionStore>,
    pub uploads: Arc<UploadStore>,
    pub cookie_name: String,
}

pub fn router(state: AppState, uploads_url_prefix: &str, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .route("/analyze", post(analyze::analyze))
        .route("/chat", post(chat::chat))
        .route("/chat/history", get(chat::history))
        .route("/health", get(|| async { "ok" }))
        .nest_service(uploads_url_prefix, uploads)
        // Room for the multipart envelope around the image
        .layer(DefaultBodyLimit::max(max_upload_bytes + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub reason: ReasonCode,
}

/// JSON error with a status derived from its reason code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(reason: ReasonCode, error: impl Into<String>) -> Self {
        Self {
            status: status_for(reason),
            body: ErrorBody {
                error: error.into(),
                reason,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(ReasonCode::Validation, error)
    }
}

pub fn status_for(reason: ReasonCode) -> StatusCode {
    match reason {
        ReasonCode::Validation => StatusCode::BAD_REQUEST,
        ReasonCode::NotFound => StatusCode::NOT_FOUND,
        ReasonCode::UnrecognizedIntent => StatusCode::UNPROCESSABLE_ENTITY,
        ReasonCode::NetworkFailure
        | ReasonCode::NoCandidates
        | ReasonCode::MalformedPayload
        | ReasonCode::UpstreamParseError => StatusCode::BAD_GATEWAY,
        ReasonCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ReasonCode::SessionStore | ReasonCode::Config | ReasonCode::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ArtLensError> for ApiError {
    fn from(e: ArtLensError) -> Self {
        let reason = e.reason();
        match &e {
            ArtLensError::Validation { reason: why, .. } => Self::new(reason, why.clone()),
            _ => {
                tracing::error!("Request failed: {}", e);
                Self::new(reason, e.to_string())
            }
        }
    }
}

impl From<TurnFailure> for ApiError {
    fn from(failure: TurnFailure) -> Self {
        tracing::error!("{}", failure);
        Self::new(failure.reason, "Could not generate a response")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
