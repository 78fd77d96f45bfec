//! Calendar API types and data structures.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Most events returned for a single day.
pub const MAX_DAILY_RESULTS: u32 = 100;

/// Calendar event as read from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    /// IANA timezone reported with the start time
    pub time_zone: Option<String>,
    pub all_day: bool,
    pub attendees: Vec<Attendee>,
    pub status: EventStatus,
    pub html_link: Option<String>,
}

/// Event time - can be a specific datetime or an all-day date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn as_datetime(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

/// Event status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

/// Event attendee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub display_name: Option<String>,
    pub response_status: ResponseStatus,
}

/// Attendee response status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum ResponseStatus {
    #[default]
    NeedsAction,
    Declined,
    Tentative,
    Accepted,
}

impl Event {
    /// Length of the event in whole minutes, rounded.
    pub fn duration_minutes(&self) -> i64 {
        let millis = (self.end.as_datetime() - self.start.as_datetime()).num_milliseconds();
        (millis as f64 / 60_000.0).round() as i64
    }
}

/// Query for `events.list`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub show_deleted: bool,
    pub single_events: bool,
    pub order_by: &'static str,
    pub max_results: u32,
}

impl EventQuery {
    /// Non-deleted, recurrence-expanded events of one local day, ordered by start.
    ///
    /// The range runs from 00:00:00.000 to 23:59:59.999 in `tz`.
    pub fn for_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<Self> {
        let start = localize(tz, date.and_time(NaiveTime::MIN))?;
        let end = localize(tz, date.and_hms_milli_opt(23, 59, 59, 999)?)?;

        Some(Self {
            time_min: start.with_timezone(&Utc),
            time_max: end.with_timezone(&Utc),
            show_deleted: false,
            single_events: true,
            order_by: "startTime",
            max_results: MAX_DAILY_RESULTS,
        })
    }
}

/// Resolve a wall-clock time in `tz`.
///
/// Ambiguous times take the earlier instant; times inside a DST gap move
/// forward by the gap, as a wall clock would.
pub fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt);
    }
    let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
    tz.from_local_datetime(&shifted).earliest()
}

/// Start or end of an event being created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 timestamp
    pub date_time: String,
    /// IANA timezone name
    pub time_zone: String,
}

impl EventDateTime {
    pub fn new<Tz: TimeZone>(dt: &DateTime<Tz>, time_zone: &str) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            date_time: dt.to_rfc3339_opts(SecondsFormat::Secs, false),
            time_zone: time_zone.to_string(),
        }
    }
}

/// Request body for `events.insert`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    #[serde(default)]
    pub attendees: Vec<ApiAttendee>,
    pub status: Option<String>,
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    pub email: String,
    pub display_name: Option<String>,
    pub response_status: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

impl Event {
    /// Convert API response to local Event.
    pub fn from_api(api: ApiEvent, calendar_id: &str) -> Self {
        let time_zone = api.start.as_ref().and_then(|t| t.time_zone.clone());

        let (start, all_day) = api
            .start
            .map(|t| parse_event_time(&t))
            .unwrap_or((EventTime::DateTime(Utc::now()), false));

        let end = api
            .end
            .map(|t| parse_event_time(&t).0)
            .unwrap_or_else(|| start.clone());

        let status = match api.status.as_deref() {
            Some("tentative") => EventStatus::Tentative,
            Some("cancelled") => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        };

        let attendees = api
            .attendees
            .into_iter()
            .map(|a| {
                let response_status = match a.response_status.as_deref() {
                    Some("accepted") => ResponseStatus::Accepted,
                    Some("declined") => ResponseStatus::Declined,
                    Some("tentative") => ResponseStatus::Tentative,
                    _ => ResponseStatus::NeedsAction,
                };
                Attendee {
                    email: a.email,
                    display_name: a.display_name,
                    response_status,
                }
            })
            .collect();

        Self {
            id: api.id,
            calendar_id: calendar_id.to_string(),
            summary: api.summary.unwrap_or_default(),
            description: api.description,
            location: api.location,
            start,
            end,
            time_zone,
            all_day,
            attendees,
            status,
            html_link: api.html_link,
        }
    }
}

fn parse_event_time(api: &ApiEventTime) -> (EventTime, bool) {
    if let Some(dt_str) = &api.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt_str) {
            return (EventTime::DateTime(dt.with_timezone(&Utc)), false);
        }
    }
    if let Some(date_str) = &api.date {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            return (EventTime::Date(date), true);
        }
    }
    (EventTime::DateTime(Utc::now()), false)
}
