//! Reminders command for previewing the notification plan.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use clap::Args;
use tp_core::{Reminder, plan_reminders};
use tp_db::Database;

use super::util::format_local;

#[derive(Debug, Default, Args)]
pub struct RemindersArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Format the reminder plan for human-readable output.
pub fn format_reminders<Tz>(reminders: &[Reminder], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if reminders.is_empty() {
        return "No reminders planned.\n".to_string();
    }

    let mut output = String::new();
    for reminder in reminders {
        output.push_str(&format_local(reminder.fire_at, tz));
        output.push_str("  ");
        output.push_str(&reminder.title);
        output.push_str(": ");
        output.push_str(&reminder.body);
        output.push('\n');
    }
    output
}

pub fn run<W, Tz>(
    writer: &mut W,
    db: &Database,
    args: &RemindersArgs,
    now: &DateTime<Tz>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let tasks = db.list_tasks()?;
    let plan = plan_reminders(&tasks, now);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&plan)?)?;
    } else {
        write!(writer, "{}", format_reminders(&plan, &now.timezone()))?;
    }
    Ok(())
}
