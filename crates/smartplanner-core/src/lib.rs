pub mod config;
pub mod error;

pub use config::{
    Config, ConfigValidationError, GeminiConfig, GoogleConfig, PlannerConfig, ValidationResult,
    GEMINI_API_KEY_ENV,
};
pub use error::{AppError, AuthError, ConfigError};

use anyhow::Result;

/// Initialize logging for the process
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("SmartPlanner core initialized");
    Ok(())
}
