use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::Value;

use super::{ApiError, AppState};
use crate::models::{ChatTurn, Prompt};

/// Session id from the cookie jar, minting one on first contact.
fn session_id(jar: CookieJar, cookie_name: &str) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(cookie_name) {
        let id = cookie.value().to_string();
        return (jar, id);
    }

    let id = uuid::Uuid::new_v4().to_string();
    let cookie = Cookie::build((cookie_name.to_string(), id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    tracing::debug!("Started chat session {}", id);
    (jar.add(cookie), id)
}

/// `POST /chat`: one conversational turn, with an optional image.
pub async fn chat(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut message = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("msg") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                message = Some(text);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                // An empty file input still sends a part with no file name
                if !file_name.is_empty() {
                    upload = Some((file_name, bytes));
                }
            }
            _ => {}
        }
    }

    let message = message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("A message is required"))?;

    let prompt = match upload {
        Some((file_name, bytes)) => {
            let stored = state.uploads.save(&file_name, &bytes).await?;
            Prompt::with_image(message, stored.image_data(bytes.to_vec()))
        }
        None => Prompt::text(message),
    };

    let (jar, id) = session_id(jar, &state.cookie_name);
    let mut session = state.sessions.load(&id).await?;
    let outcome = state.service.respond(&mut session, prompt).await;

    // Persist even on failure: the pinned intent must survive for the retry
    state.sessions.save(&session).await?;

    match outcome {
        Ok(reply) => Ok((jar, Json(Value::Object(reply))).into_response()),
        Err(failure) => Ok((jar, ApiError::from(failure)).into_response()),
    }
}

/// `GET /chat/history`: the current session's turns, oldest first.
pub async fn history(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Vec<ChatTurn>>), ApiError> {
    let (jar, id) = session_id(jar, &state.cookie_name);
    let session = state.sessions.load(&id).await?;
    Ok((jar, Json(session.turns)))
}
