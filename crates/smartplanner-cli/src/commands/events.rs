use chrono_tz::Tz;
use clap::Args;
use smartplanner_calendar::{Event, EventTime};
use smartplanner_core::AppError;

use super::{resolve_date, AppContext};

#[derive(Args)]
pub struct EventsArgs {
    /// Day to show (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub date: Option<String>,
}

pub async fn run(args: EventsArgs) -> Result<(), AppError> {
    let ctx = AppContext::load()?;
    let tz = ctx.timezone();
    let date = resolve_date(args.date.as_deref(), tz)?;

    let mut session = ctx.session();
    let events = session
        .fetch_daily_events(date)
        .await
        .map_err(|e| AppError::Service(e.fetch_message()))?;

    println!("Events for {}", date.format("%A, %B %-d, %Y"));
    if events.is_empty() {
        println!("No events scheduled for this day.");
        return Ok(());
    }

    println!();
    for line in event_table(events, tz) {
        println!("{}", line);
    }
    println!();
    for line in daily_summary(events, tz) {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn format_time(time: &EventTime, tz: Tz) -> String {
    match time {
        EventTime::DateTime(dt) => dt.with_timezone(&tz).format("%H:%M").to_string(),
        EventTime::Date(_) => "all day".to_string(),
    }
}

fn attendee_label(event: &Event) -> String {
    if event.attendees.is_empty() {
        "Just you".to_string()
    } else {
        format!("{} attendee(s)", event.attendees.len())
    }
}

fn event_table(events: &[Event], tz: Tz) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<15} {:<30} {:>9}  {:<20} {}",
        "Time", "Event", "Duration", "Location", "Attendees"
    )];

    for event in events {
        let time = if event.all_day {
            "All day".to_string()
        } else {
            format!("{} - {}", format_time(&event.start, tz), format_time(&event.end, tz))
        };
        lines.push(format!(
            "{:<15} {:<30} {:>5} min  {:<20} {}",
            time,
            event.summary,
            event.duration_minutes(),
            event.location.as_deref().unwrap_or("N/A"),
            attendee_label(event)
        ));
    }
    lines
}

fn daily_summary(events: &[Event], tz: Tz) -> Vec<String> {
    let mut lines = vec![
        "Daily Summary".to_string(),
        format!("  Total events: {}", events.len()),
    ];
    if let (Some(first), Some(last)) = (events.first(), events.last()) {
        lines.push(format!(
            "  First event:  {} at {}",
            first.summary,
            format_time(&first.start, tz)
        ));
        lines.push(format!(
            "  Last event:   {} at {}",
            last.summary,
            format_time(&last.start, tz)
        ));
    }
    lines
}
