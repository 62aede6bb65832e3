use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{ArtLensError, InferenceError, Result};
use crate::models::{GenerateContentRequest, GenerateContentResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(&self, req: &GenerateContentRequest) -> Result<GenerateContentResponse>;
}

pub struct GeminiTransport {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl GeminiTransport {
    pub fn new(cfg: &GeminiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(cfg.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArtLensError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                cfg.base_url.trim_end_matches('/'),
                cfg.model
            ),
            timeout,
        })
    }

    fn classify(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout(self.timeout)
        } else {
            InferenceError::NetworkFailure(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(&self, req: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        tracing::debug!("Sending generateContent request to {}", self.endpoint);

        // Single attempt: failures surface to the caller untouched
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::NetworkFailure(format!(
                "Gemini API returned {status}: {body}"
            ))
            .into());
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        serde_json::from_str(&body).map_err(|e| {
            ArtLensError::UpstreamParse(format!("Failed to parse Gemini API response: {e}"))
        })
    }
}
