//! Gemini client error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(reqwest::Error),
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs are not logged or shown to the user.
        Self::NetworkError(e.without_url())
    }
}

impl GeminiError {
    /// Map a non-success status and its error message.
    pub fn from_status(status: u16, message: String) -> Self {
        if status == 404 || message.contains("not found for API version") {
            Self::ModelUnavailable(message)
        } else if status == 429 {
            Self::RateLimited(message)
        } else {
            Self::ApiError { status, message }
        }
    }

    /// The configured model cannot be used with this key or API version.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }
}
