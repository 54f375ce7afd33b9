//! List command for showing tasks.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use clap::Args;
use tp_core::Task;
use tp_db::Database;

use super::util::{describe_task, short_id};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Include completed tasks.
    #[arg(short, long)]
    pub all: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Formats one task as a list row.
///
/// `*` marks a task starred for today and `x` a completed task.
pub fn format_row<Tz>(task: &Task, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let marker = if task.completed_at.is_some() {
        'x'
    } else if task.is_starred_for(now.date_naive()) {
        '*'
    } else {
        ' '
    };
    let details = describe_task(task, &now.timezone());
    if details.is_empty() {
        format!("{marker} {:<8}  {}", short_id(&task.id), task.title)
    } else {
        format!(
            "{marker} {:<8}  {}  ({details})",
            short_id(&task.id),
            task.title
        )
    }
}

pub fn run<W, Tz>(writer: &mut W, db: &Database, args: &ListArgs, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let tasks: Vec<Task> = db
        .list_tasks()?
        .into_iter()
        .filter(|t| args.all || t.is_eligible())
        .collect();

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&tasks)?)?;
        return Ok(());
    }

    if tasks.is_empty() {
        if args.all {
            writeln!(writer, "No tasks. Add one with 'tp add <title>'.")?;
        } else {
            writeln!(writer, "No open tasks. Add one with 'tp add <title>'.")?;
        }
        return Ok(());
    }

    for task in &tasks {
        writeln!(writer, "{}", format_row(task, now))?;
    }
    Ok(())
}
