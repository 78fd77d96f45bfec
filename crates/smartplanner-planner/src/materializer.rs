//! Writes a generated schedule back to the calendar as events.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use serde::Serialize;
use smartplanner_auth::TokenStore;
use smartplanner_calendar::{
    localize, CalendarApi, Event, EventDateTime, NewEvent, PRIMARY_CALENDAR,
};

use crate::error::{
    PlannerError, MSG_AUTH_REQUIRED, MSG_CALENDAR_UNAVAILABLE, MSG_CLIENT_MISSING,
    MSG_INVALID_DATE, MSG_LIBRARY_MISSING, MSG_SESSION_EXPIRED,
};
use crate::schedule::{has_clock_pattern, ClockTime, GeneratedSchedule, ScheduleItem};

pub const DEFAULT_TOOL_NAME: &str = "SmartPlanner";

const DEFAULT_SLOT_MINUTES: i64 = 30;
const MIN_SLOT_MINUTES: i64 = 15;

/// What the user sees after a materialize attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeOutcome {
    pub success: bool,
    pub message: String,
    pub created: usize,
}

impl MaterializeOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            created: 0,
        }
    }
}

/// Counts of one submission pass.
#[derive(Debug, Clone, Default)]
pub struct MaterializeReport {
    /// Events built from parseable items
    pub prepared: usize,
    /// Items skipped for an unusable time
    pub skipped: usize,
    pub created: Vec<Event>,
    /// Summaries of events the calendar rejected
    pub failed: Vec<String>,
}

/// Calendar color for a schedule priority; unknown values get Medium's.
pub fn color_for_priority(priority: Option<&str>) -> &'static str {
    match priority {
        Some("High") => "11",
        Some("Low") => "9",
        _ => "5",
    }
}

/// Place a clock time on `date`, letting overflow roll into later hours and days.
fn start_on(date: NaiveDate, clock: ClockTime, tz: &Tz) -> Option<DateTime<Tz>> {
    let minutes = i64::from(clock.hour) * 60 + i64::from(clock.minute);
    let naive = date
        .and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::try_minutes(minutes)?)?;
    localize(tz, naive)
}

fn warn_skipped(item: &ScheduleItem) {
    if has_clock_pattern(&item.time) {
        tracing::warn!("Skipping item with time out of range: {}", item.time);
    } else {
        tracing::warn!("Skipping item with invalid time format: {}", item.time);
    }
}

pub struct Materializer<'a, A: CalendarApi> {
    api: &'a A,
    tokens: &'a dyn TokenStore,
    timezone: Tz,
    calendar_id: String,
    tool_name: String,
}

impl<'a, A: CalendarApi> Materializer<'a, A> {
    pub fn new(api: &'a A, tokens: &'a dyn TokenStore, timezone: Tz) -> Self {
        Self {
            api,
            tokens,
            timezone,
            calendar_id: PRIMARY_CALENDAR.to_string(),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
        }
    }

    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    fn event_for(&self, item: &ScheduleItem, start: DateTime<Tz>, minutes: i64) -> Option<NewEvent> {
        let end = start.checked_add_signed(TimeDelta::try_minutes(minutes)?)?;
        let tz_name = self.timezone.name();
        // Blank counts as absent.
        let priority = item.priority.as_deref().filter(|p| !p.trim().is_empty());

        Some(NewEvent {
            summary: item.task.clone(),
            description: Some(format!(
                "Priority: {}\nAutomatically created by {}",
                priority.unwrap_or("Medium"),
                self.tool_name
            )),
            start: EventDateTime::new(&start, tz_name),
            end: EventDateTime::new(&end, tz_name),
            color_id: Some(color_for_priority(priority).to_string()),
        })
    }

    /// Build the events for `date` without submitting anything.
    ///
    /// Items whose time does not parse are skipped. Each event runs until the
    /// next item's start (at least 15 minutes), the last one for 30.
    pub fn prepare_events(&self, schedule: &GeneratedSchedule, date: NaiveDate) -> Vec<NewEvent> {
        let starts: Vec<Option<DateTime<Tz>>> = schedule
            .schedule
            .iter()
            .map(|item| {
                item.clock_time()
                    .and_then(|clock| start_on(date, clock, &self.timezone))
            })
            .collect();

        let mut events = Vec::new();
        for (i, item) in schedule.schedule.iter().enumerate() {
            let Some(start) = starts[i] else {
                warn_skipped(item);
                continue;
            };

            let minutes = match starts.get(i + 1) {
                Some(Some(next)) => (*next - start).num_minutes().max(MIN_SLOT_MINUTES),
                _ => DEFAULT_SLOT_MINUTES,
            };

            match self.event_for(item, start, minutes) {
                Some(event) => {
                    tracing::info!("Prepared event: \"{}\" at {}", item.task, start.format("%H:%M"));
                    events.push(event);
                }
                None => warn_skipped(item),
            }
        }
        events
    }

    async fn check_guards(&self, selected_date: &str) -> Result<(String, NaiveDate), PlannerError> {
        if !self.api.library_loaded() {
            tracing::error!("Google API not loaded");
            return Err(PlannerError::ApiUnavailable(MSG_LIBRARY_MISSING.into()));
        }
        if !self.api.client_initialized() {
            tracing::error!("Google API Client not initialized");
            return Err(PlannerError::ApiUnavailable(MSG_CLIENT_MISSING.into()));
        }
        if !self.api.calendar_loaded() {
            tracing::info!("Calendar API not loaded, attempting to load it");
            if let Err(e) = self.api.load_calendar().await {
                tracing::error!("Failed to load Calendar API: {}", e);
                return Err(PlannerError::ApiUnavailable(MSG_CALENDAR_UNAVAILABLE.into()));
            }
        }

        let token = self
            .tokens
            .load()
            .ok_or_else(|| PlannerError::Authentication(MSG_AUTH_REQUIRED.into()))?;
        if token.is_expired() {
            tracing::error!("Token has expired");
            return Err(PlannerError::Authentication(MSG_SESSION_EXPIRED.into()));
        }

        let date = NaiveDate::parse_from_str(selected_date.trim(), "%Y-%m-%d")
            .map_err(|_| PlannerError::InvalidInput(MSG_INVALID_DATE.into()))?;

        Ok((token.access_token, date))
    }

    /// Check the guards, then insert one event per parseable item, in order.
    ///
    /// A rejected insert is logged and the rest still run. Errors when a
    /// guard fails, nothing parses, or nothing was created.
    pub async fn try_materialize(
        &self,
        schedule: &GeneratedSchedule,
        selected_date: &str,
    ) -> Result<MaterializeReport, PlannerError> {
        let (access_token, date) = self.check_guards(selected_date).await?;

        let events = self.prepare_events(schedule, date);
        let mut report = MaterializeReport {
            prepared: events.len(),
            skipped: schedule.len() - events.len(),
            ..Default::default()
        };

        if events.is_empty() {
            return Err(PlannerError::NoValidEvents);
        }

        tracing::info!("Attempting to create {} events", events.len());
        for event in &events {
            match self
                .api
                .insert_event(&access_token, &self.calendar_id, event)
                .await
            {
                Ok(created) => {
                    tracing::debug!(
                        "Event created: {}",
                        created.html_link.as_deref().unwrap_or(&created.id)
                    );
                    report.created.push(created);
                }
                Err(e) => {
                    tracing::warn!("Failed to create event {}: {}", event.summary, e);
                    report.failed.push(event.summary.clone());
                }
            }
        }

        if report.created.is_empty() {
            tracing::error!("No events were created successfully");
            return Err(PlannerError::PartialSubmission(report));
        }
        Ok(report)
    }

    pub async fn materialize(&self, schedule: &GeneratedSchedule, selected_date: &str) -> MaterializeOutcome {
        match self.try_materialize(schedule, selected_date).await {
            Ok(report) => MaterializeOutcome {
                success: true,
                message: format!(
                    "Successfully added {} events to your calendar.",
                    report.created.len()
                ),
                created: report.created.len(),
            },
            Err(e) => MaterializeOutcome::failure(e.user_message()),
        }
    }
}
