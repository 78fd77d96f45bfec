//! Auth-aware access to the signed-in user's calendar for one day at a time.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use smartplanner_auth::{TokenSet, TokenStore};

use crate::api::CalendarApi;
use crate::error::CalendarError;
use crate::types::{Event, EventQuery};

pub const PRIMARY_CALENDAR: &str = "primary";

/// Token lifecycle plus the last fetched day of events.
pub struct CalendarSession<A: CalendarApi> {
    api: A,
    tokens: Arc<dyn TokenStore>,
    calendar_id: String,
    timezone: Tz,
    events: Vec<Event>,
}

impl<A: CalendarApi> CalendarSession<A> {
    pub fn new(api: A, tokens: Arc<dyn TokenStore>, timezone: Tz) -> Self {
        Self {
            api,
            tokens,
            calendar_id: PRIMARY_CALENDAR.to_string(),
            timezone,
            events: Vec::new(),
        }
    }

    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Token present and not expired.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Events from the last successful fetch.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    fn valid_token(&self) -> Result<TokenSet, CalendarError> {
        match self.tokens.load() {
            None => Err(CalendarError::AuthRequired),
            Some(token) if token.is_expired() => Err(CalendarError::TokenExpired),
            Some(token) => Ok(token),
        }
    }

    /// Fetch the events of `date` in the session's timezone.
    ///
    /// Refuses without a valid token before touching the network. A 401 from
    /// the provider clears the stored token.
    pub async fn fetch_daily_events(&mut self, date: NaiveDate) -> Result<&[Event], CalendarError> {
        let token = self.valid_token()?;

        let query = EventQuery::for_day(date, &self.timezone)
            .ok_or_else(|| CalendarError::InvalidEventData(format!("date out of range: {}", date)))?;

        if !self.api.calendar_loaded() {
            self.api.load_calendar().await?;
        }

        match self
            .api
            .list_events(&token.access_token, &self.calendar_id, &query)
            .await
        {
            Ok(events) => {
                tracing::info!("Fetched {} events for {}", events.len(), date);
                self.events = events;
                Ok(self.events.as_slice())
            }
            Err(e) => {
                if e.invalidates_token() {
                    tracing::warn!("Calendar rejected the access token, signing out");
                    if let Err(clear_err) = self.tokens.clear() {
                        tracing::error!("Failed to clear token: {}", clear_err);
                    }
                }
                Err(e)
            }
        }
    }

    /// Drop the stored token and the cached event list.
    pub fn sign_out(&mut self) -> anyhow::Result<()> {
        self.events.clear();
        self.tokens.clear()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::types::{EventStatus, EventTime, NewEvent};
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;
    use smartplanner_auth::MemoryTokenStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeCalendar {
        fail_with_401: bool,
        list_calls: AtomicUsize,
        queries: Mutex<Vec<EventQuery>>,
    }

    impl CalendarApi for FakeCalendar {
        fn calendar_loaded(&self) -> bool {
            true
        }

        async fn load_calendar(&self) -> Result<(), CalendarError> {
            Ok(())
        }

        async fn list_events(
            &self,
            _access_token: &str,
            calendar_id: &str,
            query: &EventQuery,
        ) -> Result<Vec<Event>, CalendarError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(query.clone());
            if self.fail_with_401 {
                return Err(CalendarError::TokenExpired);
            }
            Ok(vec![Event {
                id: "e1".into(),
                calendar_id: calendar_id.into(),
                summary: "Standup".into(),
                description: None,
                location: None,
                start: EventTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
                end: EventTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).unwrap()),
                time_zone: None,
                all_day: false,
                attendees: vec![],
                status: EventStatus::Confirmed,
                html_link: None,
            }])
        }

        async fn insert_event(
            &self,
            _access_token: &str,
            _calendar_id: &str,
            _event: &NewEvent,
        ) -> Result<Event, CalendarError> {
            Err(CalendarError::ApiError("not used".into()))
        }
    }

    fn valid_token() -> TokenSet {
        TokenSet::from_expires_in("token", 3600, vec![])
    }

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_keeps_events() {
        let store = Arc::new(MemoryTokenStore::with_token(valid_token()));
        let mut session = CalendarSession::new(FakeCalendar::default(), store, chrono_tz::UTC);

        let events = session.fetch_daily_events(may_first()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(session.events()[0].summary, "Standup");

        let queries = session.api().queries.lock();
        assert_eq!(queries[0].max_results, 100);
        assert!(queries[0].single_events);
    }

    #[tokio::test]
    async fn test_fetch_without_token_makes_no_call() {
        let store = Arc::new(MemoryTokenStore::new());
        let mut session = CalendarSession::new(FakeCalendar::default(), store, chrono_tz::UTC);

        let result = session.fetch_daily_events(may_first()).await;
        assert!(matches!(result, Err(CalendarError::AuthRequired)));
        assert_eq!(session.api().list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_with_expired_token_makes_no_call() {
        let expired = TokenSet {
            access_token: "old".into(),
            expires_at: 1,
            scopes: vec![],
        };
        let store = Arc::new(MemoryTokenStore::with_token(expired));
        let mut session = CalendarSession::new(FakeCalendar::default(), store, chrono_tz::UTC);

        let result = session.fetch_daily_events(may_first()).await;
        assert!(matches!(result, Err(CalendarError::TokenExpired)));
        assert_eq!(session.api().list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_401_clears_token() {
        let store = Arc::new(MemoryTokenStore::with_token(valid_token()));
        let api = FakeCalendar {
            fail_with_401: true,
            ..Default::default()
        };
        let mut session = CalendarSession::new(api, store.clone(), chrono_tz::UTC);
        assert!(session.is_authenticated());

        let result = session.fetch_daily_events(may_first()).await;
        assert!(result.is_err());
        assert!(!session.is_authenticated());
        assert!(store.load().is_none());
        assert_eq!(session.api().list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_out_clears_events_and_token() {
        let store = Arc::new(MemoryTokenStore::with_token(valid_token()));
        let mut session = CalendarSession::new(FakeCalendar::default(), store, chrono_tz::UTC);
        session.fetch_daily_events(may_first()).await.unwrap();

        session.sign_out().unwrap();
        assert!(session.events().is_empty());
        assert!(!session.is_authenticated());
    }
}
