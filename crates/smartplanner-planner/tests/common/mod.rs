//! Fakes shared by the planner integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use smartplanner_auth::TokenSet;
use smartplanner_calendar::{
    CalendarApi, CalendarError, Event, EventQuery, EventStatus, EventTime, NewEvent,
};
use smartplanner_gemini::{GeminiError, TextGenerator};

/// In-memory calendar that records every call it receives.
pub struct FakeCalendar {
    pub library_loaded: bool,
    pub client_initialized: bool,
    pub calendar_loaded: AtomicBool,
    pub load_succeeds: bool,
    /// Summaries whose insert is rejected
    pub reject: Vec<String>,
    /// Returned by `list_events`
    pub day_events: Vec<Event>,
    network_calls: AtomicUsize,
    inserted: Mutex<Vec<(String, String, NewEvent)>>,
    next_id: AtomicUsize,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self {
            library_loaded: true,
            client_initialized: true,
            calendar_loaded: AtomicBool::new(true),
            load_succeeds: true,
            reject: Vec::new(),
            day_events: Vec::new(),
            network_calls: AtomicUsize::new(0),
            inserted: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    /// Accepted inserts as (access token, calendar id, body).
    pub fn inserted(&self) -> Vec<(String, String, NewEvent)> {
        self.inserted.lock().clone()
    }

    pub fn inserted_bodies(&self) -> Vec<NewEvent> {
        self.inserted().into_iter().map(|(_, _, e)| e).collect()
    }
}

fn parse_utc(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
}

impl CalendarApi for FakeCalendar {
    fn library_loaded(&self) -> bool {
        self.library_loaded
    }

    fn client_initialized(&self) -> bool {
        self.client_initialized
    }

    fn calendar_loaded(&self) -> bool {
        self.calendar_loaded.load(Ordering::SeqCst)
    }

    async fn load_calendar(&self) -> Result<(), CalendarError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        if self.load_succeeds {
            self.calendar_loaded.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(CalendarError::ApiUnavailable("discovery failed".into()))
        }
    }

    async fn list_events(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        _query: &EventQuery,
    ) -> Result<Vec<Event>, CalendarError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.day_events.clone())
    }

    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewEvent,
    ) -> Result<Event, CalendarError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject.contains(&event.summary) {
            return Err(CalendarError::InvalidEventData(format!("rejected {}", event.summary)));
        }

        self.inserted
            .lock()
            .push((access_token.to_string(), calendar_id.to_string(), event.clone()));

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Event {
            id: format!("created{}", id),
            calendar_id: calendar_id.to_string(),
            summary: event.summary.clone(),
            description: event.description.clone(),
            location: None,
            start: EventTime::DateTime(parse_utc(&event.start.date_time)),
            end: EventTime::DateTime(parse_utc(&event.end.date_time)),
            time_zone: Some(event.start.time_zone.clone()),
            all_day: false,
            attendees: vec![],
            status: EventStatus::Confirmed,
            html_link: None,
        })
    }
}

/// Generator that replays a canned reply and keeps the prompts it saw.
pub struct FakeGenerator {
    reply: Result<String, u16>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        self.prompts.lock().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(GeminiError::from_status(*status, "fake failure".into())),
        }
    }
}

pub fn valid_token() -> TokenSet {
    TokenSet::from_expires_in("access-123", 3600, vec![])
}

pub fn expired_token() -> TokenSet {
    TokenSet {
        access_token: "stale".into(),
        expires_at: Utc::now().timestamp_millis() - 60_000,
        scopes: vec![],
    }
}

pub fn timed_event(summary: &str, start: &str, end: &str) -> Event {
    Event {
        id: summary.to_lowercase().replace(' ', "-"),
        calendar_id: "primary".into(),
        summary: summary.into(),
        description: None,
        location: None,
        start: EventTime::DateTime(parse_utc(start)),
        end: EventTime::DateTime(parse_utc(end)),
        time_zone: None,
        all_day: false,
        attendees: vec![],
        status: EventStatus::Confirmed,
        html_link: None,
    }
}
