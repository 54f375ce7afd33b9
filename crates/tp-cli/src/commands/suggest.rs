//! Suggest command for the ranked shortlist of what to do next.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use clap::Args;
use serde::Serialize;
use tp_core::{Capacity, ScoredTask, clamp_to_next_conflict, rank_tasks};
use tp_db::Database;

use super::calendar_file::CalendarFile;
use super::util::{describe_task, format_minutes, short_id};
use crate::Config;

#[derive(Debug, Default, Args)]
pub struct SuggestArgs {
    /// How much energy you have right now: low, med or high.
    #[arg(long)]
    pub capacity: Option<Capacity>,

    /// Minutes available. Defaults to `default_minutes` from the config.
    #[arg(long, allow_negative_numbers = true)]
    pub minutes: Option<i64>,

    /// Maximum number of suggestions. Defaults to `max_suggestions` from the config.
    #[arg(long)]
    pub max: Option<usize>,

    /// Shrink the available minutes to end before the next calendar event.
    #[arg(long)]
    pub clamp: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON output structure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSuggestions<'a> {
    pub capacity: Capacity,
    pub available_minutes: i64,
    pub suggestions: Vec<ScoredTask<'a>>,
}

/// Format suggestions for human-readable output.
pub fn format_suggestions<Tz>(
    suggestions: &[ScoredTask<'_>],
    capacity: Capacity,
    available_minutes: i64,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut lines = vec![format!(
        "Suggestions for {capacity} capacity with {} available:",
        format_minutes(available_minutes)
    )];

    if suggestions.is_empty() {
        lines.push("Nothing to suggest. Add a task with 'tp add <title>'.".to_string());
    }

    for (rank, scored) in suggestions.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!(
            "{}. {}  [{}]  score {:.2}",
            rank + 1,
            scored.task.title,
            short_id(&scored.task.id),
            scored.score
        ));
        let details = describe_task(scored.task, tz);
        if !details.is_empty() {
            lines.push(format!("   {details}"));
        }
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

pub fn run<W, Tz>(
    writer: &mut W,
    db: &Database,
    args: &SuggestArgs,
    config: &Config,
    now: &DateTime<Tz>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let capacity = args.capacity.unwrap_or_default();
    let requested = args.minutes.unwrap_or(config.default_minutes);
    let max_suggestions = args.max.unwrap_or(config.max_suggestions);

    let available_minutes = if args.clamp {
        let calendar = CalendarFile::new(&config.calendar_path);
        clamp_to_next_conflict(requested, &calendar, now, &config.free_blocks())
    } else {
        requested
    };
    tracing::debug!(requested, available_minutes, %capacity, "suggesting tasks");

    let tasks = db.list_tasks()?;
    let suggestions = rank_tasks(
        &tasks,
        capacity,
        available_minutes,
        max_suggestions,
        now.with_timezone(&Utc),
    );

    if args.json {
        let output = JsonSuggestions {
            capacity,
            available_minutes,
            suggestions,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        let output =
            format_suggestions(&suggestions, capacity, available_minutes, &now.timezone());
        write!(writer, "{output}")?;
    }
    Ok(())
}
