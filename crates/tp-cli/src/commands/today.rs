//! Today command for the day's starred priorities and the brain dump.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use tp_core::{brain_dump_tasks, starred_tasks};
use tp_db::Database;

use super::list::format_row;

pub fn run<W, Tz>(writer: &mut W, db: &Database, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let tasks = db.list_tasks()?;
    let starred = starred_tasks(&tasks, now.date_naive());
    let brain_dump = brain_dump_tasks(&tasks);

    writeln!(writer, "TODAY'S PRIORITIES")?;
    if starred.is_empty() {
        writeln!(writer, "Nothing starred. Use 'tp star <id>' to pick up to 3.")?;
    }
    for task in &starred {
        writeln!(writer, "{}", format_row(task, now))?;
    }

    writeln!(writer)?;
    writeln!(writer, "BRAIN DUMP")?;
    if brain_dump.is_empty() {
        writeln!(writer, "Empty. Add a task with 'tp add <title>'.")?;
    }
    for task in &brain_dump {
        writeln!(writer, "{}", format_row(task, now))?;
    }
    Ok(())
}
