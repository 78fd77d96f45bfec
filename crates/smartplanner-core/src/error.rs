//! Application-level errors shared by the SmartPlanner binaries.
//!
//! Service crates keep their own error enums; anything that reaches the
//! command line is folded into `AppError`, whose `user_message()` is what
//! gets printed. `Display` keeps the detail for logs.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for showing the user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Already user-facing message from the calendar, planner or generator.
    #[error("{0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Auth(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service(msg) => msg,
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "A file is malformed. Check its contents.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Authentication errors (OAuth, tokens).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("Token storage error: {0}")]
    StorageError(String),

    #[error("Port {0} already in use for OAuth callback")]
    PortInUse(u16),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::OAuthFailed(_) => "Sign-in failed. Please try again.",
            AuthError::StorageError(_) => "Failed to save credentials. Please try again.",
            AuthError::PortInUse(_) => "Sign-in port is busy. Close other apps and try again.",
        }
    }
}
