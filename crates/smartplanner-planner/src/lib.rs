//! Daily planning for SmartPlanner.
//!
//! Holds the user's task list, asks the text generator for a schedule that
//! fits the day's calendar events, and writes the schedule back as events.

pub mod error;
pub mod materializer;
pub mod schedule;
pub mod synthesizer;
pub mod tasks;

pub use error::PlannerError;
pub use materializer::{
    color_for_priority, MaterializeOutcome, MaterializeReport, Materializer, DEFAULT_TOOL_NAME,
};
pub use schedule::{
    has_clock_pattern, parse_clock_time, ClockTime, GeneratedSchedule, ScheduleItem,
    ScheduleParseError,
};
pub use synthesizer::{build_prompt, parse_day_boundary, Synthesizer};
pub use tasks::{Priority, Task, TaskDraft, TaskStore, TimeOfDay, DEFAULT_TASK_MINUTES};
