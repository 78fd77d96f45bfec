//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Token expired")]
    TokenExpired,

    #[error("Calendar API unavailable: {0}")]
    ApiUnavailable(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// User-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => {
                "Authentication required. Please sign in to Google Calendar first.".to_string()
            }
            Self::TokenExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::ApiUnavailable(_) => {
                "Calendar API not available. Please make sure you granted calendar access and try again."
                    .to_string()
            }
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::CalendarNotFound(_) => "Calendar not found".to_string(),
            Self::InvalidEventData(msg) => format!("Invalid event: {}", msg),
            Self::ApiError(msg) => format!("Calendar error: {}", msg),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Message shown when a daily fetch fails.
    pub fn fetch_message(&self) -> String {
        format!("Error fetching calendar events: {}", self)
    }

    /// Whether the stored token should be dropped.
    pub fn invalidates_token(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}
