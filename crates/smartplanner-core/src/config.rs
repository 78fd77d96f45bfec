use anyhow::{Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, ConfigError};

/// Environment variable that overrides `gemini.api_key`.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Google OAuth and Calendar settings
    #[serde(default)]
    pub google: GoogleConfig,

    /// Generative model settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Planning defaults
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Google OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client ID from Google Cloud Console
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Loopback port for the OAuth redirect
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,
    /// Calendar that events are read from and written to
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

fn default_redirect_port() -> u16 {
    8080
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

impl GoogleConfig {
    /// Check if credentials are configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.client_id.starts_with("YOUR_")
            && !self.client_secret.starts_with("YOUR_")
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: "YOUR_GOOGLE_CLIENT_ID".to_string(),
            client_secret: "YOUR_GOOGLE_CLIENT_SECRET".to_string(),
            redirect_port: default_redirect_port(),
            calendar_id: default_calendar_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; `GEMINI_API_KEY` takes precedence when set
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

impl GeminiConfig {
    /// API key from the environment, falling back to the config file.
    pub fn effective_api_key(&self) -> String {
        std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| self.api_key.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Default wake-up time (HH:MM)
    #[serde(default = "default_wakeup_time")]
    pub wakeup_time: String,
    /// Default sleep time (HH:MM)
    #[serde(default = "default_sleep_time")]
    pub sleep_time: String,
    /// IANA timezone name; unset means `TZ`, then the system zone, then UTC
    #[serde(default)]
    pub timezone: Option<String>,
    /// Name written into created event descriptions
    #[serde(default = "default_tool_name")]
    pub tool_name: String,
    /// Duration given to tasks entered without one
    #[serde(default = "default_task_minutes")]
    pub default_task_minutes: u32,
}

fn default_wakeup_time() -> String {
    "07:00".to_string()
}

fn default_sleep_time() -> String {
    "22:00".to_string()
}

fn default_tool_name() -> String {
    "SmartPlanner".to_string()
}

fn default_task_minutes() -> u32 {
    30
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            wakeup_time: default_wakeup_time(),
            sleep_time: default_sleep_time(),
            timezone: None,
            tool_name: default_tool_name(),
            default_task_minutes: default_task_minutes(),
        }
    }
}

impl PlannerConfig {
    /// Resolve the viewer's timezone.
    ///
    /// Order: configured name, the `TZ` environment variable, the system
    /// zone, then UTC. Unknown names are logged and skipped.
    pub fn resolved_timezone(&self) -> Tz {
        let env_tz = std::env::var("TZ").ok();
        let system_tz = match iana_time_zone::get_timezone() {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!("System timezone unavailable: {}", e);
                None
            }
        };
        resolve_timezone(self.timezone.as_deref(), env_tz.as_deref(), system_tz.as_deref())
    }
}

fn resolve_timezone(configured: Option<&str>, env: Option<&str>, system: Option<&str>) -> Tz {
    for candidate in [configured, env, system].into_iter().flatten() {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        match candidate.parse::<Tz>() {
            Ok(tz) => return tz,
            Err(_) => tracing::warn!("Ignoring unknown timezone: {}", candidate),
        }
    }
    Tz::UTC
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating default if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> std::result::Result<(Self, ValidationResult), AppError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.gemini.base_url, "gemini.base_url", &mut result);

        if self.gemini.model.trim().is_empty() {
            result.add_error("gemini.model", "Model name must not be empty");
        }

        if self.gemini.effective_api_key().trim().is_empty() {
            result.add_warning(
                "gemini.api_key",
                format!(
                    "No API key configured (set {} or gemini.api_key) - schedule generation will fail",
                    GEMINI_API_KEY_ENV
                ),
            );
        }

        if !self.google.is_configured() {
            result.add_warning(
                "google",
                "Google OAuth not configured - sign-in will be unavailable",
            );
        }

        if self.google.redirect_port == 0 {
            result.add_error("google.redirect_port", "Port cannot be 0");
        }

        if self.google.calendar_id.trim().is_empty() {
            result.add_error("google.calendar_id", "Calendar ID must not be empty");
        }

        for (field, value) in [
            ("planner.wakeup_time", &self.planner.wakeup_time),
            ("planner.sleep_time", &self.planner.sleep_time),
        ] {
            if NaiveTime::parse_from_str(value, "%H:%M").is_err() {
                result.add_error(field, format!("Expected HH:MM, got: {}", value));
            }
        }

        if let Some(tz) = &self.planner.timezone {
            if tz.parse::<Tz>().is_err() {
                result.add_error("planner.timezone", format!("Unknown timezone: {}", tz));
            }
        }

        if self.planner.default_task_minutes == 0 {
            result.add_error(
                "planner.default_task_minutes",
                "Default task duration must be greater than 0",
            );
        }

        if self.planner.tool_name.trim().is_empty() {
            result.add_warning("planner.tool_name", "Tool name is empty");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Directory holding config.toml and stored tokens
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Failed to get config directory")?
            .join("smartplanner"))
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.gemini.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "gemini.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.gemini.base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_bad_wakeup_time() {
        let mut config = Config::default();
        config.planner.wakeup_time = "7am".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "planner.wakeup_time"));
    }

    #[test]
    fn test_unknown_timezone_is_error() {
        let mut config = Config::default();
        config.planner.timezone = Some("Mars/Olympus_Mons".to_string());
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "planner.timezone"));
    }

    #[test]
    fn test_configured_timezone_resolves() {
        let planner = PlannerConfig {
            timezone: Some("Europe/Helsinki".to_string()),
            ..PlannerConfig::default()
        };
        assert_eq!(planner.resolved_timezone(), chrono_tz::Europe::Helsinki);
    }

    #[test]
    fn test_system_zone_used_when_config_and_env_unset() {
        assert_eq!(
            resolve_timezone(None, None, Some("America/New_York")),
            chrono_tz::America::New_York
        );
        assert_eq!(resolve_timezone(None, None, None), Tz::UTC);
    }

    #[test]
    fn test_timezone_precedence() {
        assert_eq!(
            resolve_timezone(Some("Asia/Tokyo"), Some("Europe/Paris"), Some("America/Chicago")),
            chrono_tz::Asia::Tokyo
        );
        assert_eq!(
            resolve_timezone(None, Some("Europe/Paris"), Some("America/Chicago")),
            chrono_tz::Europe::Paris
        );
        assert_eq!(
            resolve_timezone(Some("Mars/Base"), Some(""), Some("America/Chicago")),
            chrono_tz::America::Chicago
        );
    }

    #[test]
    fn test_google_not_configured_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "google"));
    }

    #[test]
    fn test_load_from_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.google.calendar_id, "primary");
        assert_eq!(config.planner.tool_name, "SmartPlanner");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[planner]\nwakeup_time = \"06:30\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.planner.wakeup_time, "06:30");
        assert_eq!(config.planner.sleep_time, "22:00");
        assert_eq!(config.gemini.model, "gemini-2.0-flash-exp");
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
