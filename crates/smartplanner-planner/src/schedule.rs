//! Structured schedules as returned by the model.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// First "H:MM", optionally followed by AM/PM, anywhere in the string.
#[allow(clippy::expect_used)]
static CLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+):([0-9]+)\s*(AM|PM)?").expect("Invalid regex")
});

#[derive(Error, Debug)]
pub enum ScheduleParseError {
    #[error("Failed to parse schedule from API response")]
    NoJsonObject,

    #[error("response is not valid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("response does not match the schedule format: {0}")]
    SchemaMismatch(serde_json::Error),
}

/// One slot of a generated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Free-form, usually "H:MM AM/PM"
    pub time: String,
    pub task: String,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Wall-clock time read from a schedule item.
///
/// `hour` is already normalized from 12-hour notation but not range-checked;
/// out-of-range values roll over when placed on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ScheduleItem {
    pub fn new(time: impl Into<String>, task: impl Into<String>, priority: Option<&str>) -> Self {
        Self {
            time: time.into(),
            task: task.into(),
            priority: priority.map(str::to_string),
        }
    }

    /// Parse `time`, or `None` when it has no usable "H:MM".
    pub fn clock_time(&self) -> Option<ClockTime> {
        parse_clock_time(&self.time)
    }
}

/// Whether `text` contains an "H:MM" at all, usable or not.
pub fn has_clock_pattern(text: &str) -> bool {
    CLOCK_PATTERN.is_match(text)
}

/// First "H:MM" in `text`; `None` when absent or its digits overflow.
pub fn parse_clock_time(text: &str) -> Option<ClockTime> {
    let caps = CLOCK_PATTERN.captures(text)?;
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;

    match caps.get(3).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("PM") if hour < 12 => hour += 12,
        Some("AM") if hour == 12 => hour = 0,
        _ => {}
    }

    Some(ClockTime { hour, minute })
}

/// Ordered plan; the model's order is kept as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    pub schedule: Vec<ScheduleItem>,
}

impl GeneratedSchedule {
    pub fn new(schedule: Vec<ScheduleItem>) -> Self {
        Self { schedule }
    }

    pub fn len(&self) -> usize {
        self.schedule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Pull the schedule out of free text around a JSON object.
    ///
    /// Takes everything from the first `{` to the last `}` and requires it to
    /// be `{"schedule": [{"time", "task", "priority"?}]}`.
    pub fn from_response(text: &str) -> Result<Self, ScheduleParseError> {
        let span = extract_json_object(text).ok_or(ScheduleParseError::NoJsonObject)?;
        let value: serde_json::Value =
            serde_json::from_str(span).map_err(ScheduleParseError::InvalidJson)?;
        serde_json::from_value(value).map_err(ScheduleParseError::SchemaMismatch)
    }
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_parse_wrapped_response() {
        let text = "Sure! Here is your plan:\n```json\n{\"schedule\": [\
            {\"time\": \"9:00 AM\", \"task\": \"Write report\", \"priority\": \"High\"},\
            {\"time\": \"10:30 AM\", \"task\": \"Email\", \"priority\": null},\
            {\"time\": \"11:00 AM\", \"task\": \"Walk\"}\
            ]}\n```\nEnjoy your day.";

        let schedule = GeneratedSchedule::from_response(text).unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.schedule[0].priority.as_deref(), Some("High"));
        assert_eq!(schedule.schedule[1].priority, None);
        assert_eq!(schedule.schedule[2].task, "Walk");
    }

    #[test]
    fn test_no_braces() {
        let err = GeneratedSchedule::from_response("I cannot help with that").unwrap_err();
        assert!(matches!(err, ScheduleParseError::NoJsonObject));

        let err = GeneratedSchedule::from_response("} backwards {").unwrap_err();
        assert!(matches!(err, ScheduleParseError::NoJsonObject));
    }

    #[test]
    fn test_invalid_json() {
        let err = GeneratedSchedule::from_response("{schedule: [}").unwrap_err();
        assert!(matches!(err, ScheduleParseError::InvalidJson(_)));
    }

    #[test]
    fn test_schema_mismatch() {
        for text in [
            r#"{"plan": []}"#,
            r#"{"schedule": [{"time": "9:00"}]}"#,
            r#"{"schedule": [{"time": 9, "task": "x"}]}"#,
            r#"{"schedule": "none"}"#,
        ] {
            let err = GeneratedSchedule::from_response(text).unwrap_err();
            assert!(matches!(err, ScheduleParseError::SchemaMismatch(_)), "{}", text);
        }
    }

    #[test]
    fn test_greedy_span_spans_two_objects() {
        // The span runs from the first '{' to the last '}', so two objects fail.
        let text = r#"{"schedule": []} and {"other": 1}"#;
        assert!(matches!(
            GeneratedSchedule::from_response(text),
            Err(ScheduleParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_clock_time_twelve_hour() {
        assert_eq!(parse_clock_time("9:00 AM"), Some(ClockTime { hour: 9, minute: 0 }));
        assert_eq!(parse_clock_time("12:15 am"), Some(ClockTime { hour: 0, minute: 15 }));
        assert_eq!(parse_clock_time("12:30 PM"), Some(ClockTime { hour: 12, minute: 30 }));
        assert_eq!(parse_clock_time("1:05PM"), Some(ClockTime { hour: 13, minute: 5 }));
    }

    #[test]
    fn test_clock_time_without_period_is_24_hour() {
        assert_eq!(parse_clock_time("14:45"), Some(ClockTime { hour: 14, minute: 45 }));
        assert_eq!(parse_clock_time("9:00"), Some(ClockTime { hour: 9, minute: 0 }));
    }

    #[test]
    fn test_clock_time_first_match_unanchored() {
        assert_eq!(
            parse_clock_time("from 7:30 AM to 8:00 AM"),
            Some(ClockTime { hour: 7, minute: 30 })
        );
        assert_eq!(parse_clock_time("25:75"), Some(ClockTime { hour: 25, minute: 75 }));
    }

    #[test]
    fn test_clock_time_unparseable() {
        assert_eq!(parse_clock_time("garbled"), None);
        assert_eq!(parse_clock_time("noon"), None);
    }

    #[test]
    fn test_clock_time_overflowing_digits() {
        assert!(has_clock_pattern("99999999999:00"));
        assert_eq!(parse_clock_time("99999999999:00"), None);
        assert!(!has_clock_pattern("noon"));
    }
}
