use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;
use smartplanner_calendar::Event;
use smartplanner_core::{AppError, ConfigError};
use smartplanner_gemini::GeminiClient;
use smartplanner_planner::{
    parse_day_boundary, GeneratedSchedule, Materializer, PlannerError, Priority, Synthesizer,
    TaskDraft, TaskStore, TimeOfDay,
};

use super::{resolve_date, AppContext};

#[derive(Args)]
pub struct PlanArgs {
    /// Day to plan (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub date: Option<String>,

    /// Wake-up time (HH:MM)
    #[arg(long)]
    pub wakeup: Option<String>,

    /// Sleep time (HH:MM)
    #[arg(long)]
    pub sleep: Option<String>,

    /// Task as TITLE[,PRIORITY[,TIME_OF_DAY[,MINUTES]]]; repeatable
    #[arg(long = "task", value_name = "SPEC")]
    pub tasks: Vec<String>,

    /// TOML file with [[task]] tables
    #[arg(long = "tasks", value_name = "FILE")]
    pub tasks_file: Option<PathBuf>,

    /// Add the generated schedule to the calendar
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Deserialize)]
struct TaskFile {
    #[serde(default)]
    task: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Priority,
    #[serde(default, alias = "timeOfDay")]
    time_of_day: TimeOfDay,
    #[serde(default)]
    duration: Option<u32>,
}

impl TaskEntry {
    fn into_draft(self, default_minutes: u32) -> TaskDraft {
        let mut draft = TaskDraft::new(self.title)
            .with_priority(self.priority)
            .with_time_of_day(self.time_of_day)
            .with_duration(self.duration.unwrap_or(default_minutes));
        if let Some(description) = self.description {
            draft = draft.with_description(description);
        }
        draft
    }
}

fn planner_error(e: PlannerError) -> AppError {
    AppError::Service(e.user_message())
}

/// Parse `TITLE[,PRIORITY[,TIME_OF_DAY[,MINUTES]]]`.
pub(crate) fn parse_task_spec(spec: &str, default_minutes: u32) -> Result<TaskDraft, PlannerError> {
    let mut parts = spec.splitn(4, ',').map(str::trim);
    let title = parts.next().unwrap_or_default();

    let mut draft = TaskDraft::new(title).with_duration(default_minutes);
    if let Some(priority) = parts.next().filter(|p| !p.is_empty()) {
        draft = draft.with_priority(priority.parse()?);
    }
    if let Some(time_of_day) = parts.next().filter(|t| !t.is_empty()) {
        draft = draft.with_time_of_day(time_of_day.parse()?);
    }
    if let Some(minutes) = parts.next().filter(|m| !m.is_empty()) {
        let minutes = minutes.parse().map_err(|_| {
            PlannerError::invalid_input(format!("Invalid duration '{}' in task '{}'", minutes, spec))
        })?;
        draft = draft.with_duration(minutes);
    }
    Ok(draft)
}

fn read_task_file(path: &Path, default_minutes: u32) -> Result<Vec<TaskDraft>, AppError> {
    let content = std::fs::read_to_string(path)?;
    let file: TaskFile = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
    Ok(file
        .task
        .into_iter()
        .map(|entry| entry.into_draft(default_minutes))
        .collect())
}

fn collect_tasks(args: &PlanArgs, default_minutes: u32) -> Result<TaskStore, AppError> {
    let mut drafts = Vec::new();
    if let Some(path) = &args.tasks_file {
        drafts.extend(read_task_file(path, default_minutes)?);
    }
    for spec in &args.tasks {
        drafts.push(parse_task_spec(spec, default_minutes).map_err(planner_error)?);
    }

    let mut store = TaskStore::new();
    for draft in drafts {
        store.add_task(draft).map_err(planner_error)?;
    }
    Ok(store)
}

fn print_schedule(schedule: &GeneratedSchedule) {
    println!("Your optimized schedule:");
    for item in &schedule.schedule {
        match &item.priority {
            Some(priority) => println!("  {:<10} {}  [{}]", item.time, item.task, priority),
            None => println!("  {:<10} {}", item.time, item.task),
        }
    }
}

pub async fn run(args: PlanArgs) -> Result<(), AppError> {
    let ctx = AppContext::load()?;
    let planner = &ctx.config.planner;
    let tz = ctx.timezone();
    let date = resolve_date(args.date.as_deref(), tz)?;

    let wakeup = parse_day_boundary(args.wakeup.as_deref().unwrap_or(&planner.wakeup_time))
        .map_err(planner_error)?;
    let sleep = parse_day_boundary(args.sleep.as_deref().unwrap_or(&planner.sleep_time))
        .map_err(planner_error)?;
    let tasks = collect_tasks(&args, planner.default_task_minutes)?;

    let mut session = ctx.session();
    let events: Vec<Event> = if session.is_authenticated() {
        match session.fetch_daily_events(date).await {
            Ok(events) => events.to_vec(),
            Err(e) => {
                eprintln!("{}", e.fetch_message());
                Vec::new()
            }
        }
    } else {
        println!("Not signed in to Google Calendar; planning without calendar events.");
        Vec::new()
    };

    let gemini = &ctx.config.gemini;
    let client = GeminiClient::new_with_base_url(
        &gemini.base_url,
        gemini.effective_api_key(),
        gemini.model.clone(),
    );
    let synthesizer = Synthesizer::new(client);

    println!(
        "Planning {} with {} events and {} tasks...",
        date,
        events.len(),
        tasks.len()
    );
    let schedule = synthesizer
        .synthesize(wakeup, sleep, &events, tasks.tasks())
        .await
        .map_err(planner_error)?;
    print_schedule(&schedule);

    if !args.apply {
        return Ok(());
    }

    let outcome = Materializer::new(session.api(), session.tokens(), tz)
        .with_calendar_id(session.calendar_id())
        .with_tool_name(planner.tool_name.clone())
        .materialize(&schedule, &date.format("%Y-%m-%d").to_string())
        .await;

    if outcome.success {
        println!("{}", outcome.message);
        Ok(())
    } else {
        Err(AppError::Service(outcome.message))
    }
}
