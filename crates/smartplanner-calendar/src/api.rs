//! The calendar provider seam used by the session and the planner.

use crate::client::CalendarClient;
use crate::error::CalendarError;
use crate::types::{Event, EventQuery, NewEvent};

/// Operations the planner needs from a calendar provider.
///
/// `library_loaded` and `client_initialized` describe whether the provider
/// is usable at all; `calendar_loaded` reports whether the Calendar API
/// surface is ready, and `load_calendar` tries to make it so.
pub trait CalendarApi: Send + Sync {
    fn library_loaded(&self) -> bool {
        true
    }

    fn client_initialized(&self) -> bool {
        true
    }

    fn calendar_loaded(&self) -> bool;

    async fn load_calendar(&self) -> Result<(), CalendarError>;

    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<Event>, CalendarError>;

    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<Event, CalendarError>;
}

impl CalendarApi for CalendarClient {
    fn calendar_loaded(&self) -> bool {
        self.is_calendar_loaded()
    }

    async fn load_calendar(&self) -> Result<(), CalendarError> {
        self.load_discovery().await
    }

    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<Event>, CalendarError> {
        let response = CalendarClient::list_events(self, access_token, calendar_id, query).await?;
        Ok(response
            .items
            .into_iter()
            .map(|e| Event::from_api(e, calendar_id))
            .collect())
    }

    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<Event, CalendarError> {
        CalendarClient::insert_event(self, access_token, calendar_id, event).await
    }
}
