use super::*;
use crate::config::ClassificationScheme;
use crate::error::{InferenceError, Result};
use crate::models::{Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part};
use crate::session::MemorySessionStore;
use crate::transport::Transport;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use tower::ServiceExt;

const BOUNDARY: &str = "artlens-test-boundary";

// Replays canned Gemini replies in order
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<GenerateContentResponse>>>,
    calls: Mutex<Vec<GenerateContentRequest>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<GenerateContentResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn generate(&self, req: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        self.calls.lock().unwrap().push(req.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ArtLensError::Internal("No more scripted replies".to_string())))
    }
}

fn gemini(value: Value) -> Result<GenerateContentResponse> {
    Ok(GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".to_string()),
                parts: vec![Part::Text {
                    text: value.to_string(),
                }],
            }),
        }],
    })
}

fn app(transport: Arc<ScriptedTransport>, uploads_dir: &std::path::Path) -> Router {
    let state = AppState {
        service: Arc::new(ArtService::with_transport(
            transport,
            ClassificationScheme::Focus,
        )),
        sessions: Arc::new(MemorySessionStore::new(3600)),
        uploads: Arc::new(UploadStore::new(uploads_dir, "/uploads", 1024 * 1024)),
        cookie_name: "artlens_session".to_string(),
    };
    router(state, "/uploads", 1024 * 1024)
}

fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Body {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn post_multipart(uri: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie should be set")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn emotion_feedback() -> Value {
    json!({
        "color_palette": "Cooler blues would deepen the melancholy",
        "brushwork_texture": "Looser strokes in the sky",
        "composition_framing": "Isolate the figure",
        "lighting_shadow": "Lower the key",
        "lines_shapes": "Favor drooping curves",
        "scale_proportion": "Make the figure smaller",
        "brushstroke_movement": "Slow, horizontal strokes"
    })
}

#[tokio::test]
async fn test_history_mints_cookie_and_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(ScriptedTransport::new(vec![]), dir.path());

    let response = app
        .oneshot(Request::get("/chat/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).starts_with("artlens_session="));
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_chat_turn_is_recorded_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new(vec![
        gemini(json!({"focus": "Emotion"})),
        gemini(emotion_feedback()),
    ]);
    let app = app(transport.clone(), dir.path());

    let response = app
        .clone()
        .oneshot(post_multipart(
            "/chat",
            None,
            multipart(&[
                ("msg", None, b"How do I make this feel sadder?"),
                ("file", Some(""), b""),
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert_eq!(json_body(response).await, emotion_feedback());
    assert_eq!(transport.calls.lock().unwrap().len(), 2);

    let response = app
        .oneshot(
            Request::get("/chat/history")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let turns = json_body(response).await;
    let turns = turns.as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["speaker"], "User");
    assert_eq!(turns[0]["utterance"], "How do I make this feel sadder?");
    assert_eq!(turns[1]["speaker"], "Bot");
}

#[tokio::test]
async fn test_chat_upstream_failure_maps_to_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new(vec![
        gemini(json!({"focus": "Artstyle"})),
        Err(InferenceError::NetworkFailure("503 Service Unavailable".to_string()).into()),
    ]);
    let app = app(transport, dir.path());

    let response = app
        .clone()
        .oneshot(post_multipart(
            "/chat",
            None,
            multipart(&[("msg", None, b"More impressionist please")]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let cookie = session_cookie(&response);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "network_failure");
    assert_eq!(body["error"], "Could not generate a response");

    let response = app
        .oneshot(
            Request::get("/chat/history")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_chat_without_message_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new(vec![]);
    let app = app(transport.clone(), dir.path());

    let response = app
        .oneshot(post_multipart("/chat", None, multipart(&[("msg", None, b"   ")])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], "validation");
    assert!(transport.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_requires_file_part() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(ScriptedTransport::new(vec![]), dir.path());

    let response = app
        .clone()
        .oneshot(post_multipart("/analyze", None, multipart(&[("other", None, b"x")])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No file part");

    let response = app
        .oneshot(post_multipart("/analyze", None, multipart(&[("file", Some(""), b"")])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No selected file");
}

#[tokio::test]
async fn test_analyze_stores_image_and_returns_record() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = json!({
        "type": "Artwork", "title": "The Starry Night", "creator": "Vincent van Gogh",
        "style": "Post-Impressionism", "year": 1889, "era": "Modern",
        "culturalOrigin": "Netherlands", "provenance": "MoMA, New York",
        "contextualMeaning": "A view from the asylum window at Saint-Remy"
    });
    let transport = ScriptedTransport::new(vec![gemini(analysis.clone())]);
    let app = app(transport.clone(), dir.path());

    let response = app
        .oneshot(post_multipart(
            "/analyze",
            None,
            multipart(&[("file", Some("starry.jpg"), b"\xff\xd8\xff\xe0")]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["analysis"], analysis);
    let image_url = body["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/") && image_url.ends_with(".jpg"));

    let file_name = image_url.trim_start_matches("/uploads/");
    assert!(dir.path().join(file_name).exists());

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let request = serde_json::to_value(&calls[0]).unwrap();
    assert_eq!(
        request["contents"][0]["parts"][0]["inlineData"]["mimeType"],
        "image/jpeg"
    );
}
