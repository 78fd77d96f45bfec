//! Turns the day's events and tasks into a generated schedule.

use chrono::{NaiveTime, SecondsFormat};
use serde::Serialize;
use smartplanner_calendar::{Event, EventTime};
use smartplanner_gemini::TextGenerator;

use crate::error::PlannerError;
use crate::schedule::GeneratedSchedule;
use crate::tasks::Task;

/// Entry of the combined event/task list sent to the model.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum PlanEntry<'a> {
    #[serde(rename_all = "camelCase")]
    Event {
        title: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        start_time: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_time: Option<String>,
        priority: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    Task {
        title: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<&'a str>,
        duration: u32,
        priority: &'static str,
        time_of_day: &'static str,
    },
}

fn timed(time: &EventTime) -> Option<String> {
    match time {
        EventTime::DateTime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        EventTime::Date(_) => None,
    }
}

fn plan_entries<'a>(events: &'a [Event], tasks: &'a [Task]) -> Vec<PlanEntry<'a>> {
    let events = events.iter().map(|e| PlanEntry::Event {
        title: &e.summary,
        start_time: timed(&e.start),
        end_time: timed(&e.end),
        priority: "Medium",
    });
    let tasks = tasks.iter().map(|t| PlanEntry::Task {
        title: &t.title,
        description: t.description.as_deref(),
        duration: t.duration,
        priority: t.priority.as_str(),
        time_of_day: t.time_of_day.as_str(),
    });
    events.chain(tasks).collect()
}

/// Parse an `HH:MM` wake-up or sleep time.
pub fn parse_day_boundary(text: &str) -> Result<NaiveTime, PlannerError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|_| PlannerError::invalid_input(format!("Invalid time '{}', expected HH:MM", text)))
}

/// Prompt asking for a schedule of the whole day.
pub fn build_prompt(wakeup: NaiveTime, sleep: NaiveTime, events: &[Event], tasks: &[Task]) -> String {
    let entries = serde_json::to_string(&plan_entries(events, tasks)).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Generate an optimized daily schedule based on the following parameters:\n\
         - Wake-up time: {wakeup}\n\
         - Sleep time: {sleep}\n\
         - Existing events and tasks: {entries}\n\
         \n\
         Please organize tasks by priority (High, Medium, Low) and respect the preferred time of day for tasks when provided.\n\
         Return the schedule as a valid JSON object with a 'schedule' array containing time slots and assigned tasks.\n\
         Each item in the array should have 'time' (like \"9:00 AM\"), 'task', and 'priority' fields.\n\
         Include brief transitions between tasks and suggest the best time for high-priority tasks when energy levels are optimal.\n",
        wakeup = wakeup.format("%H:%M"),
        sleep = sleep.format("%H:%M"),
        entries = entries,
    )
}

pub struct Synthesizer<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> Synthesizer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// One generation call, parsed strictly. No retry.
    pub async fn synthesize(
        &self,
        wakeup: NaiveTime,
        sleep: NaiveTime,
        events: &[Event],
        tasks: &[Task],
    ) -> Result<GeneratedSchedule, PlannerError> {
        let prompt = build_prompt(wakeup, sleep, events, tasks);
        tracing::info!(
            "Generating schedule from {} events and {} tasks",
            events.len(),
            tasks.len()
        );

        let text = self.generator.generate(&prompt).await.map_err(|e| {
            tracing::error!("Gemini API error: {}", e);
            PlannerError::Generation(e)
        })?;

        let schedule = GeneratedSchedule::from_response(&text).map_err(|e| {
            tracing::error!("Unusable schedule response: {}", e);
            PlannerError::Parse(e)
        })?;

        tracing::info!("Generated schedule with {} items", schedule.len());
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::tasks::{Priority, TaskDraft, TaskStore, TimeOfDay};
    use chrono::{NaiveDate, TimeZone, Utc};
    use smartplanner_calendar::EventStatus;

    fn event(summary: &str, start: EventTime, end: EventTime) -> Event {
        Event {
            id: summary.to_lowercase(),
            calendar_id: "primary".into(),
            summary: summary.into(),
            description: None,
            location: None,
            start,
            end,
            time_zone: None,
            all_day: false,
            attendees: vec![],
            status: EventStatus::Confirmed,
            html_link: None,
        }
    }

    fn prompt_entries(prompt: &str) -> serde_json::Value {
        let line = prompt
            .lines()
            .find_map(|l| l.trim().strip_prefix("- Existing events and tasks: "))
            .unwrap();
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_prompt_lists_events_then_tasks() {
        let standup = event(
            "Standup",
            EventTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            EventTime::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).unwrap()),
        );
        let mut store = TaskStore::new();
        store
            .add_task(
                TaskDraft::new("Deep work")
                    .with_priority(Priority::High)
                    .with_time_of_day(TimeOfDay::Morning)
                    .with_duration(90),
            )
            .unwrap();

        let prompt = build_prompt(
            NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(22, 30, 0).unwrap(),
            &[standup],
            store.tasks(),
        );

        assert!(prompt.contains("Wake-up time: 07:00"));
        assert!(prompt.contains("Sleep time: 22:30"));

        let entries = prompt_entries(&prompt);
        assert_eq!(
            entries[0],
            serde_json::json!({
                "title": "Standup",
                "startTime": "2024-05-01T09:00:00Z",
                "endTime": "2024-05-01T09:15:00Z",
                "priority": "Medium"
            })
        );
        assert_eq!(
            entries[1],
            serde_json::json!({
                "title": "Deep work",
                "duration": 90,
                "priority": "High",
                "timeOfDay": "Morning"
            })
        );
    }

    #[test]
    fn test_all_day_event_has_no_times() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let holiday = event("Holiday", EventTime::Date(date), EventTime::Date(date));
        let prompt = build_prompt(
            NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            &[holiday],
            &[],
        );

        let entries = prompt_entries(&prompt);
        assert_eq!(entries[0], serde_json::json!({"title": "Holiday", "priority": "Medium"}));
    }

    #[test]
    fn test_parse_day_boundary() {
        assert_eq!(
            parse_day_boundary("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert!(matches!(
            parse_day_boundary("7am"),
            Err(PlannerError::InvalidInput(_))
        ));
    }
}
