//! Delete command for removing a task.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tp_core::TaskRepository;
use tp_db::Database;

use super::util::resolve_task_id;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Task ID or unique ID prefix.
    pub id: String,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &DeleteArgs) -> Result<()> {
    let tasks = db.list_tasks()?;
    let id = resolve_task_id(&tasks, &args.id)?;
    let title = tasks
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.title.clone())
        .unwrap_or_default();

    db.delete(&id)
        .with_context(|| format!("failed to delete task {id}"))?;
    writeln!(writer, "Deleted: {title}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    #[test]
    fn delete_removes_task() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let mut db = Database::open_in_memory().unwrap();
        let keep = db.add("keep", now).unwrap();
        let drop = db.add("drop", now).unwrap();

        let mut output = Vec::new();
        let args = DeleteArgs {
            id: drop.id.to_string(),
        };
        run(&mut output, &mut db, &args).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Deleted: drop\n");

        let remaining = db.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);

        assert!(run(&mut Vec::new(), &mut db, &args).is_err());
    }
}
