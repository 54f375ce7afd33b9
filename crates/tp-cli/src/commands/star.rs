//! Star command for toggling today's featured priorities.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use clap::Args;
use tp_core::TaskRepository;
use tp_db::Database;

use super::util::resolve_task_id;

#[derive(Debug, Args)]
pub struct StarArgs {
    /// Task ID or unique ID prefix.
    pub id: String,
}

/// Stars a task for today (in `now`'s time zone) or removes the star.
pub fn run<W, Tz>(
    writer: &mut W,
    db: &mut Database,
    args: &StarArgs,
    now: &DateTime<Tz>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
{
    let id = resolve_task_id(&db.list_tasks()?, &args.id)?;
    let today = now.date_naive();
    let task = db
        .toggle_star(&id, today)
        .with_context(|| format!("failed to star task {id}"))?;

    if task.starred_for.is_some() {
        writeln!(writer, "Starred for today: {}", task.title)?;
    } else {
        writeln!(writer, "Unstarred: {}", task.title)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn star_toggles_and_enforces_limit() {
        let mut db = Database::open_in_memory().unwrap();
        let ids: Vec<String> = (1..=4)
            .map(|i| db.add(&format!("task {i}"), now()).unwrap().id.to_string())
            .collect();

        let mut output = Vec::new();
        for id in &ids[..3] {
            run(&mut output, &mut db, &StarArgs { id: id.clone() }, &now()).unwrap();
        }
        let fourth = StarArgs { id: ids[3].clone() };
        let err = run(&mut output, &mut db, &fourth, &now()).unwrap_err();
        assert!(format!("{err:#}").contains("already 3 tasks starred for 2026-03-02"));

        run(&mut output, &mut db, &StarArgs { id: ids[0].clone() }, &now()).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.lines().last().unwrap(), "Unstarred: task 1");
        assert_eq!(output.lines().next().unwrap(), "Starred for today: task 1");
    }
}
