//! Done command for toggling task completion.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use tp_core::TaskRepository;
use tp_db::Database;

use super::util::resolve_task_id;

#[derive(Debug, Args)]
pub struct DoneArgs {
    /// Task ID or unique ID prefix.
    pub id: String,
}

/// Completes an open task or reopens a completed one.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &DoneArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let id = resolve_task_id(&db.list_tasks()?, &args.id)?;
    let task = db
        .toggle_complete(&id, now)
        .with_context(|| format!("failed to toggle task {id}"))?;

    if task.completed_at.is_some() {
        writeln!(writer, "Completed: {}", task.title)?;
    } else {
        writeln!(writer, "Reopened: {}", task.title)?;
    }
    Ok(())
}
