//! In-memory task list the user builds before planning a day.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

pub const DEFAULT_TASK_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "high")]
    High,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(PlannerError::invalid_input(format!(
                "Unknown priority '{}'. Use High, Medium or Low.",
                other
            ))),
        }
    }
}

/// Preferred part of the day for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[default]
    #[serde(alias = "anytime")]
    Anytime,
    #[serde(alias = "morning")]
    Morning,
    #[serde(alias = "afternoon")]
    Afternoon,
    #[serde(alias = "evening")]
    Evening,
    #[serde(alias = "night")]
    Night,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anytime => "Anytime",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anytime" | "any" => Ok(Self::Anytime),
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            "night" => Ok(Self::Night),
            other => Err(PlannerError::invalid_input(format!(
                "Unknown time of day '{}'. Use Anytime, Morning, Afternoon, Evening or Night.",
                other
            ))),
        }
    }
}

/// User input for a task, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, alias = "timeOfDay")]
    pub time_of_day: TimeOfDay,
    #[serde(default = "default_duration")]
    pub duration: u32,
}

fn default_duration() -> u32 {
    DEFAULT_TASK_MINUTES
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            time_of_day: TimeOfDay::default(),
            duration: DEFAULT_TASK_MINUTES,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    fn validate(&self) -> Result<(), PlannerError> {
        if self.title.trim().is_empty() {
            return Err(PlannerError::invalid_input("Task title cannot be empty"));
        }
        if self.duration == 0 {
            return Err(PlannerError::invalid_input(
                "Task duration must be at least one minute",
            ));
        }
        Ok(())
    }
}

/// A validated task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub time_of_day: TimeOfDay,
    /// Minutes, always positive
    pub duration: u32,
}

impl Task {
    fn from_draft(id: String, draft: TaskDraft) -> Self {
        let description = draft
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self {
            id,
            title: draft.title.trim().to_string(),
            description,
            priority: draft.priority,
            time_of_day: draft.time_of_day,
            duration: draft.duration,
        }
    }
}

/// Ordered task list. Nothing is persisted.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    last_id: i64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epoch milliseconds, bumped past the previous id when the clock has not moved.
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        let id = if now <= self.last_id {
            self.last_id.saturating_add(1)
        } else {
            now
        };
        self.last_id = id;
        id.to_string()
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<&Task, PlannerError> {
        draft.validate()?;
        let id = self.next_id();
        let index = self.tasks.len();
        self.tasks.push(Task::from_draft(id, draft));
        tracing::debug!("Added task, {} in list", self.tasks.len());
        // `index` is the slot just pushed.
        Ok(&self.tasks[index])
    }

    /// Replace a task's fields, keeping its id and position.
    pub fn update_task(&mut self, id: &str, draft: TaskDraft) -> Result<&Task, PlannerError> {
        draft.validate()?;
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| PlannerError::invalid_input(format!("No task with id {}", id)))?;
        *slot = Task::from_draft(id.to_string(), draft);
        Ok(&*slot)
    }

    pub fn remove_task(&mut self, id: &str) -> Result<Task, PlannerError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| PlannerError::invalid_input(format!("No task with id {}", id)))?;
        Ok(self.tasks.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
