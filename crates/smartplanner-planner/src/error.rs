//! Planner error types.

use smartplanner_gemini::GeminiError;
use thiserror::Error;

use crate::materializer::MaterializeReport;
use crate::schedule::ScheduleParseError;

pub const MSG_LIBRARY_MISSING: &str = "Google API not loaded. Please restart and try again.";
pub const MSG_CLIENT_MISSING: &str = "Google API Client not initialized. Please sign in again.";
pub const MSG_CALENDAR_UNAVAILABLE: &str =
    "Calendar API not available. Please make sure you granted calendar access and try again.";
pub const MSG_AUTH_REQUIRED: &str =
    "Authentication required. Please sign in to Google Calendar first.";
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const MSG_INVALID_DATE: &str = "Invalid date selected.";
pub const MSG_NO_VALID_EVENTS: &str = "No valid events to add to calendar.";
pub const MSG_NONE_CREATED: &str =
    "Failed to create any events. Please check your Google Calendar permissions.";
pub const MSG_MODEL_UNAVAILABLE: &str = "API configuration error: The AI model is temporarily unavailable. Please check your API key and try again later.";

#[derive(Error, Debug)]
pub enum PlannerError {
    /// No token, or the token has expired.
    #[error("{0}")]
    Authentication(String),

    /// Client library, client or calendar capability missing.
    #[error("{0}")]
    ApiUnavailable(String),

    #[error("Could not parse schedule: {0}")]
    Parse(#[from] ScheduleParseError),

    /// Every prepared event was rejected by the calendar.
    #[error("{}", submission_summary(.0))]
    PartialSubmission(MaterializeReport),

    /// The schedule had no item with a usable time.
    #[error("{}", MSG_NO_VALID_EVENTS)]
    NoValidEvents,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Generation(#[from] GeminiError),
}

fn submission_summary(report: &MaterializeReport) -> String {
    format!(
        "{} of {} events failed to submit",
        report.failed.len(),
        report.prepared
    )
}

impl PlannerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// User-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication(msg) | Self::ApiUnavailable(msg) | Self::InvalidInput(msg) => {
                msg.clone()
            }
            Self::NoValidEvents => MSG_NO_VALID_EVENTS.to_string(),
            Self::PartialSubmission(_) => MSG_NONE_CREATED.to_string(),
            Self::Parse(e) => format!("Failed to generate schedule: {}", e),
            Self::Generation(e) if e.is_model_unavailable() => MSG_MODEL_UNAVAILABLE.to_string(),
            Self::Generation(e) => format!("Failed to generate schedule: {}", e),
        }
    }
}
