//! Storage layer for task picker.
//!
//! Persists tasks with `rusqlite` and implements [`TaskRepository`] on top.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without a `Mutex`.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2026-01-15T10:30:00.000Z`). `starred_for` is a plain `YYYY-MM-DD`
//! date. List order is insertion order reversed (newest first), tracked by
//! SQLite's implicit `rowid`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use tp_core::{
    Effort, EnergyLevel, Importance, RepositoryError, Task, TaskId, TaskRepository, TaskUpdate,
    next_star,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp or date.
    #[error("invalid {field} for task {task_id}: {value}")]
    DateParse {
        task_id: String,
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored column holds a value the domain rejects.
    #[error("invalid {field} for task {task_id}: {message}")]
    InvalidValue {
        task_id: String,
        field: &'static str,
        message: String,
    },
    /// The repository refused the operation.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A task row exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TaskRow {
    id: String,
    title: String,
    notes: Option<String>,
    created_at: String,
    deadline: Option<String>,
    estimated_minutes: Option<i64>,
    importance: Option<i64>,
    effort: Option<i64>,
    energy: Option<String>,
    starred_for: Option<String>,
    completed_at: Option<String>,
}

const TASK_COLUMNS: &str = "id, title, notes, created_at, deadline, estimated_minutes, \
     importance, effort, energy, starred_for, completed_at";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                notes TEXT,
                created_at TEXT NOT NULL,
                deadline TEXT,
                estimated_minutes INTEGER CHECK (estimated_minutes > 0),
                importance INTEGER CHECK (importance BETWEEN 1 AND 3),
                effort INTEGER CHECK (effort BETWEEN 1 AND 3),
                energy TEXT CHECK (energy IN ('low', 'med', 'high')),
                starred_for TEXT,
                completed_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_starred ON tasks(starred_for);
            CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(completed_at);
            ",
        )?;
        Ok(())
    }

    /// Inserts a task as the newest entry.
    pub fn insert_task(&self, task: &Task) -> Result<(), DbError> {
        let row = TaskRow::from_task(task);
        self.conn.execute(
            &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                row.id,
                row.title,
                row.notes,
                row.created_at,
                row.deadline,
                row.estimated_minutes,
                row.importance,
                row.effort,
                row.energy,
                row.starred_for,
                row.completed_at,
            ],
        )?;
        Ok(())
    }

    /// Writes every mutable field of `task` back to its row.
    ///
    /// Returns `false` if no row has the task's ID.
    pub fn save_task(&self, task: &Task) -> Result<bool, DbError> {
        let row = TaskRow::from_task(task);
        let updated = self.conn.execute(
            "
            UPDATE tasks
            SET title = ?, notes = ?, deadline = ?, estimated_minutes = ?, importance = ?,
                effort = ?, energy = ?, starred_for = ?, completed_at = ?
            WHERE id = ?
            ",
            params![
                row.title,
                row.notes,
                row.deadline,
                row.estimated_minutes,
                row.importance,
                row.effort,
                row.energy,
                row.starred_for,
                row.completed_at,
                row.id,
            ],
        )?;
        Ok(updated > 0)
    }

    /// Lists all tasks, newest first.
    pub fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY rowid DESC"))?;
        let rows = stmt.query_map([], TaskRow::from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        tracing::debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Looks up a single task.
    pub fn get_task(&self, id: &TaskId) -> Result<Option<Task>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"),
                [id.as_str()],
                TaskRow::from_row,
            )
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    /// Deletes a task. Returns `false` if it did not exist.
    pub fn delete_task(&self, id: &TaskId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?", [id.as_str()])?;
        Ok(deleted > 0)
    }

    fn require_task(&self, id: &TaskId) -> Result<Task, DbError> {
        self.get_task(id)?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()).into())
    }
}

impl TaskRepository for Database {
    type Error = DbError;

    fn list(&self) -> Result<Vec<Task>, Self::Error> {
        self.list_tasks()
    }

    fn add(&mut self, title: &str, now: DateTime<Utc>) -> Result<Task, Self::Error> {
        let task = Task::new(title, now).map_err(RepositoryError::from)?;
        self.insert_task(&task)?;
        tracing::info!(task_id = %task.id, "added task");
        Ok(task)
    }

    fn update(&mut self, id: &TaskId, update: TaskUpdate) -> Result<Task, Self::Error> {
        let mut task = self.require_task(id)?;
        task.apply(update).map_err(RepositoryError::from)?;
        self.save_task(&task)?;
        Ok(task)
    }

    fn delete(&mut self, id: &TaskId) -> Result<(), Self::Error> {
        if !self.delete_task(id)? {
            return Err(RepositoryError::NotFound(id.clone()).into());
        }
        tracing::info!(task_id = %id, "deleted task");
        Ok(())
    }

    fn toggle_complete(&mut self, id: &TaskId, now: DateTime<Utc>) -> Result<Task, Self::Error> {
        let mut task = self.require_task(id)?;
        task.completed_at = match task.completed_at {
            Some(_) => None,
            None => Some(now),
        };
        self.save_task(&task)?;
        Ok(task)
    }

    fn toggle_star(&mut self, id: &TaskId, today: NaiveDate) -> Result<Task, Self::Error> {
        let tasks = self.list_tasks()?;
        let starred_for = next_star(&tasks, id, today)?;
        let mut task = self.require_task(id)?;
        task.starred_for = starred_for;
        self.save_task(&task)?;
        Ok(task)
    }
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            notes: row.get(2)?,
            created_at: row.get(3)?,
            deadline: row.get(4)?,
            estimated_minutes: row.get(5)?,
            importance: row.get(6)?,
            effort: row.get(7)?,
            energy: row.get(8)?,
            starred_for: row.get(9)?,
            completed_at: row.get(10)?,
        })
    }

    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            notes: task.notes.clone(),
            created_at: format_timestamp(task.created_at),
            deadline: task.deadline.map(format_timestamp),
            estimated_minutes: task.estimate().map(i64::from),
            importance: task.importance.map(|i| i64::from(i.value())),
            effort: task.effort.map(|e| i64::from(e.value())),
            energy: task.energy.map(|e| e.as_str().to_string()),
            starred_for: task.starred_for.map(|d| d.format(DATE_FORMAT).to_string()),
            completed_at: task.completed_at.map(format_timestamp),
        }
    }

    fn into_task(self) -> Result<Task, DbError> {
        let id = self.id;
        let invalid = |field: &'static str, message: String| DbError::InvalidValue {
            task_id: id.clone(),
            field,
            message,
        };

        let estimated_minutes = self
            .estimated_minutes
            .map(|m| u32::try_from(m).map_err(|e| invalid("estimated_minutes", e.to_string())))
            .transpose()?;
        let importance = self
            .importance
            .map(|v| Importance::new(v).map_err(|e| invalid("importance", e.to_string())))
            .transpose()?;
        let effort = self
            .effort
            .map(|v| Effort::new(v).map_err(|e| invalid("effort", e.to_string())))
            .transpose()?;
        let energy = self
            .energy
            .map(|v| v.parse::<EnergyLevel>().map_err(|e| invalid("energy", e.to_string())))
            .transpose()?;

        Ok(Task {
            id: TaskId::new(id.clone()).map_err(|e| invalid("id", e.to_string()))?,
            title: self.title,
            notes: self.notes,
            created_at: parse_timestamp(&self.created_at, &id, "created_at")?,
            deadline: self
                .deadline
                .map(|v| parse_timestamp(&v, &id, "deadline"))
                .transpose()?,
            estimated_minutes,
            importance,
            effort,
            energy,
            starred_for: self
                .starred_for
                .map(|v| parse_date(&v, &id))
                .transpose()?,
            completed_at: self
                .completed_at
                .map(|v| parse_timestamp(&v, &id, "completed_at"))
                .transpose()?,
        })
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_timestamp(
    timestamp: &str,
    task_id: &str,
    field: &'static str,
) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::DateParse {
            task_id: task_id.to_string(),
            field,
            value: timestamp.to_string(),
            source,
        })
}

fn parse_date(date: &str, task_id: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| DbError::DateParse {
        task_id: task_id.to_string(),
        field: "starred_for",
        value: date.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
