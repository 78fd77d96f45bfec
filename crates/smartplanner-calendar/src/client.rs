//! Google Calendar API client.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::SecondsFormat;
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const CALENDAR_DISCOVERY_URL: &str =
    "https://www.googleapis.com/discovery/v1/apis/calendar/v3/rest";

pub struct CalendarClient {
    client: reqwest::Client,
    base_url: String,
    discovery_url: String,
    calendar_loaded: AtomicBool,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: CALENDAR_API_BASE.to_string(),
            discovery_url: CALENDAR_DISCOVERY_URL.to_string(),
            calendar_loaded: AtomicBool::new(false),
        }
    }

    /// Client against another host; discovery is expected under the same host.
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            discovery_url: format!("{}/discovery/v1/apis/calendar/v3/rest", base_url),
            calendar_loaded: AtomicBool::new(false),
        }
    }

    fn auth_header(access_token: &str) -> String {
        format!("Bearer {}", access_token)
    }

    /// Whether the Calendar API discovery document has been loaded.
    pub fn is_calendar_loaded(&self) -> bool {
        self.calendar_loaded.load(Ordering::Acquire)
    }

    /// Load the Calendar API discovery document.
    #[instrument(skip(self), level = "info")]
    pub async fn load_discovery(&self) -> Result<(), CalendarError> {
        let response = self.client.get(&self.discovery_url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CalendarError::ApiUnavailable(format!("{}: {}", status, text)));
        }

        self.calendar_loaded.store(true, Ordering::Release);
        tracing::info!("Calendar API loaded");
        Ok(())
    }

    /// List events from a calendar within a time range.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<EventListResponse, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&showDeleted={}&singleEvents={}&orderBy={}&maxResults={}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(&query.time_min.to_rfc3339_opts(SecondsFormat::Millis, true)),
            urlencoding::encode(&query.time_max.to_rfc3339_opts(SecondsFormat::Millis, true)),
            query.show_deleted,
            query.single_events,
            query.order_by,
            query.max_results,
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", Self::auth_header(access_token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create a new event.
    #[instrument(skip(self, access_token, event), fields(summary = %event.summary), level = "info")]
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<Event, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id),
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", Self::auth_header(access_token))
            .json(event)
            .send()
            .await?;

        let api_event: ApiEvent = self.handle_response(response).await?;
        Ok(Event::from_api(api_event, calendar_id))
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::CalendarNotFound(text))
        } else if status.as_u16() == 400 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::InvalidEventData(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}
