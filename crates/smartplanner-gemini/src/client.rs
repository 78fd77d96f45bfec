//! Gemini `generateContent` client.

use tracing::instrument;

use crate::error::GeminiError;
use crate::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Something that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_base_url(DEFAULT_BASE_URL, api_key, model)
    }

    pub fn new_with_base_url(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Send one user prompt and return the first candidate's text.
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()), level = "info")]
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        if self.api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        // Key in a header, never in the URL.
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!("Gemini returned {}: {}", status, message);
            return Err(GeminiError::from_status(status.as_u16(), message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        let text = parsed
            .text()
            .ok_or_else(|| GeminiError::InvalidResponse("no candidates returned".to_string()))?;
        tracing::debug!("Gemini returned {} characters", text.len());
        Ok(text)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        self.generate_content(prompt).await
    }
}
