//! Add command for quick-adding a task by title.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use tp_core::TaskRepository;
use tp_db::Database;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}

/// Adds the task and prints its ID.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &AddArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let title = args.title.join(" ");
    let task = db.add(&title, now).context("failed to add task")?;
    writeln!(writer, "{}", task.id)?;
    Ok(())
}
