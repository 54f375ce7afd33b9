//! Task repository capability.
//!
//! Storage lives behind [`TaskRepository`]. Scoring and free-block code never
//! see a repository, only the `&[Task]` snapshot returned by
//! [`TaskRepository::list`].

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::task::{MAX_STARRED, Task, TaskUpdate, starred_tasks};
use crate::types::{TaskId, ValidationError};

/// Errors shared by every repository implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No task has the given ID.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Starring would exceed the daily limit.
    #[error("already {limit} tasks starred for {day}; unstar one first")]
    StarLimit { limit: usize, day: NaiveDate },

    /// The requested change produced an invalid task.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Create, edit and list tasks.
///
/// Implementations persist however they like; the ordering of [`list`](Self::list)
/// is newest first.
pub trait TaskRepository {
    type Error: std::error::Error + From<RepositoryError>;

    /// All tasks, newest first.
    fn list(&self) -> Result<Vec<Task>, Self::Error>;

    /// Adds a quick-add task with only a title.
    fn add(&mut self, title: &str, now: DateTime<Utc>) -> Result<Task, Self::Error>;

    /// Applies a partial update and returns the updated task.
    fn update(&mut self, id: &TaskId, update: TaskUpdate) -> Result<Task, Self::Error>;

    /// Removes a task.
    fn delete(&mut self, id: &TaskId) -> Result<(), Self::Error>;

    /// Marks an open task done at `now`, or reopens a done task.
    fn toggle_complete(&mut self, id: &TaskId, now: DateTime<Utc>) -> Result<Task, Self::Error>;

    /// Stars a task for `today`, or removes today's star.
    fn toggle_star(&mut self, id: &TaskId, today: NaiveDate) -> Result<Task, Self::Error>;
}

/// Computes the new `starred_for` value when toggling the star on `id`.
///
/// Starring fails once [`MAX_STARRED`] open tasks already carry today's star.
pub fn next_star(
    tasks: &[Task],
    id: &TaskId,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, RepositoryError> {
    let task = tasks
        .iter()
        .find(|t| &t.id == id)
        .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;

    if task.is_starred_for(today) {
        return Ok(None);
    }
    if starred_tasks(tasks, today).len() >= MAX_STARRED {
        return Err(RepositoryError::StarLimit {
            limit: MAX_STARRED,
            day: today,
        });
    }
    Ok(Some(today))
}

/// A repository held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Vec<Task>,
}

impl InMemoryTaskRepository {
    /// Creates a repository seeded with `tasks`, kept in the given order.
    pub const fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    fn find_mut(&mut self, id: &TaskId) -> Result<&mut Task, RepositoryError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}

impl TaskRepository for InMemoryTaskRepository {
    type Error = RepositoryError;

    fn list(&self) -> Result<Vec<Task>, Self::Error> {
        Ok(self.tasks.clone())
    }

    fn add(&mut self, title: &str, now: DateTime<Utc>) -> Result<Task, Self::Error> {
        let task = Task::new(title, now)?;
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    fn update(&mut self, id: &TaskId, update: TaskUpdate) -> Result<Task, Self::Error> {
        let task = self.find_mut(id)?;
        let mut edited = task.clone();
        edited.apply(update)?;
        *task = edited.clone();
        Ok(edited)
    }

    fn delete(&mut self, id: &TaskId) -> Result<(), Self::Error> {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        if self.tasks.len() == before {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn toggle_complete(&mut self, id: &TaskId, now: DateTime<Utc>) -> Result<Task, Self::Error> {
        let task = self.find_mut(id)?;
        task.completed_at = match task.completed_at {
            Some(_) => None,
            None => Some(now),
        };
        Ok(task.clone())
    }

    fn toggle_star(&mut self, id: &TaskId, today: NaiveDate) -> Result<Task, Self::Error> {
        let starred_for = next_star(&self.tasks, id, today)?;
        let task = self.find_mut(id)?;
        task.starred_for = starred_for;
        Ok(task.clone())
    }
}
