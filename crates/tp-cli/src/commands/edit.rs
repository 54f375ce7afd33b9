//! Edit command for patching task details.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeZone};
use clap::Args;
use tp_core::{Effort, EnergyLevel, Importance, TaskRepository, TaskUpdate};
use tp_db::Database;

use super::util::{parse_datetime, resolve_task_id, short_id};

#[derive(Debug, Default, Args)]
pub struct EditArgs {
    /// Task ID or unique ID prefix.
    pub id: String,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// Free-form notes.
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,

    /// Deadline (RFC 3339, YYYY-MM-DD, 'in 2 days' or '3 hours ago').
    #[arg(long, conflicts_with = "clear_deadline")]
    pub deadline: Option<String>,

    /// Estimated minutes of work.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..), conflicts_with = "clear_estimate")]
    pub estimate: Option<u32>,

    /// Importance from 1 (low) to 3 (high).
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=3), conflicts_with = "clear_importance")]
    pub importance: Option<i64>,

    /// Effort from 1 (light) to 3 (heavy).
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=3), conflicts_with = "clear_effort")]
    pub effort: Option<i64>,

    /// Energy the task needs: low, med or high.
    #[arg(long, conflicts_with = "clear_energy")]
    pub energy: Option<EnergyLevel>,

    /// Remove the notes.
    #[arg(long)]
    pub clear_notes: bool,
    /// Remove the deadline.
    #[arg(long)]
    pub clear_deadline: bool,
    /// Remove the estimate.
    #[arg(long)]
    pub clear_estimate: bool,
    /// Remove the importance.
    #[arg(long)]
    pub clear_importance: bool,
    /// Remove the effort.
    #[arg(long)]
    pub clear_effort: bool,
    /// Remove the energy level.
    #[arg(long)]
    pub clear_energy: bool,
}

/// A setter wins over a clear flag; neither leaves the field untouched.
fn patch<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    match (value, clear) {
        (Some(v), _) => Some(Some(v)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}

/// Builds the task patch described by the arguments.
pub fn build_update<Tz: TimeZone>(args: &EditArgs, now: &DateTime<Tz>) -> Result<TaskUpdate> {
    let deadline = args
        .deadline
        .as_deref()
        .map(|s| parse_datetime(s, now))
        .transpose()
        .context("invalid --deadline")?;
    let importance = args.importance.map(Importance::new).transpose()?;
    let effort = args.effort.map(Effort::new).transpose()?;

    Ok(TaskUpdate {
        title: args.title.clone(),
        notes: patch(args.notes.clone(), args.clear_notes),
        deadline: patch(deadline, args.clear_deadline),
        estimated_minutes: patch(args.estimate, args.clear_estimate),
        importance: patch(importance, args.clear_importance),
        effort: patch(effort, args.clear_effort),
        energy: patch(args.energy, args.clear_energy),
    })
}

pub fn run<W, Tz>(
    writer: &mut W,
    db: &mut Database,
    args: &EditArgs,
    now: &DateTime<Tz>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
{
    let update = build_update(args, now)?;
    if update.is_empty() {
        bail!("nothing to change; pass at least one field to edit");
    }

    let id = resolve_task_id(&db.list_tasks()?, &args.id)?;
    let task = db
        .update(&id, update)
        .with_context(|| format!("failed to update task {id}"))?;
    tracing::debug!(task_id = %task.id, "edited task");
    writeln!(writer, "Updated {}: {}", short_id(&task.id), task.title)?;
    Ok(())
}
