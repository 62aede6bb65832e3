use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::models::AnalysisRecord;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub image_url: String,
    pub analysis: AnalysisRecord,
}

/// `POST /analyze`: store the uploaded image and identify the work.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        upload = Some((file_name, bytes));
    }

    let Some((file_name, bytes)) = upload else {
        return Err(ApiError::bad_request("No file part"));
    };
    if file_name.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }

    let stored = state.uploads.save(&file_name, &bytes).await?;
    let analysis = state
        .service
        .analyze(stored.image_data(bytes.to_vec()))
        .await?;

    Ok(Json(AnalyzeResponse {
        image_url: stored.url,
        analysis,
    }))
}
