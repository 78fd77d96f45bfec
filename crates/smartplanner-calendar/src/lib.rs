//! Google Calendar integration for SmartPlanner.
//!
//! Provides the Calendar API client, the provider seam the planner is written
//! against, and the auth-aware daily session.

pub mod api;
pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use api::CalendarApi;
pub use client::CalendarClient;
pub use error::CalendarError;
pub use session::{CalendarSession, PRIMARY_CALENDAR};
pub use types::{
    localize, Attendee, Event, EventDateTime, EventQuery, EventStatus, EventTime, NewEvent,
    ResponseStatus, MAX_DAILY_RESULTS,
};
