pub mod auth;
pub mod events;
pub mod plan;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use smartplanner_auth::{FileTokenStore, GoogleOAuth2Provider, TokenStore};
use smartplanner_calendar::{CalendarClient, CalendarSession};
use smartplanner_core::{AppError, AuthError, Config, ConfigError};

/// Loaded configuration plus the token store every command shares.
pub struct AppContext {
    pub config: Config,
    pub tokens: Arc<dyn TokenStore>,
}

impl AppContext {
    pub fn load() -> Result<Self, AppError> {
        let (config, _) = Config::load_validated()?;
        let store = FileTokenStore::default_location()
            .map_err(|e| AuthError::StorageError(e.to_string()))?;
        Ok(Self {
            config,
            tokens: Arc::new(store),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.config.planner.resolved_timezone()
    }

    pub fn session(&self) -> CalendarSession<CalendarClient> {
        CalendarSession::new(CalendarClient::new(), self.tokens.clone(), self.timezone())
            .with_calendar_id(self.config.google.calendar_id.clone())
    }

    pub fn google_provider(&self) -> Result<GoogleOAuth2Provider, AppError> {
        let google = &self.config.google;
        if !google.is_configured() {
            return Err(ConfigError::MissingSetting(
                "google.client_id and google.client_secret".to_string(),
            )
            .into());
        }
        Ok(GoogleOAuth2Provider::new(
            google.client_id.clone(),
            google.client_secret.clone(),
            google.redirect_port,
        ))
    }
}

/// `YYYY-MM-DD`, or today in `tz` when absent.
pub fn resolve_date(date: Option<&str>, tz: Tz) -> Result<NaiveDate, AppError> {
    match date {
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Service(format!("Invalid date '{}', expected YYYY-MM-DD", text))),
        None => Ok(Utc::now().with_timezone(&tz).date_naive()),
    }
}

/// Message printed for a failed command.
pub fn describe(err: &AppError) -> String {
    match err {
        AppError::Service(msg) => msg.clone(),
        AppError::Other(e) => e.to_string(),
        other => format!("{} ({})", other.user_message(), other),
    }
}
