//! Core domain logic for task picker.
//!
//! This crate contains the pure, side-effect-free parts of the system:
//! - Scoring: ranking open tasks for the user's capacity and available time
//! - Free blocks: finding free time between calendar events
//! - Reminders: planning deadline and evening notifications
//!
//! Storage and calendar access sit behind the [`TaskRepository`] and
//! [`CalendarSource`] traits so callers can plug in their own.

pub mod calendar;
pub mod free_blocks;
pub mod reminders;
pub mod repository;
pub mod scoring;
pub mod task;
pub mod types;

pub use calendar::{BusyInterval, CalendarError, CalendarSnapshot, CalendarSource, end_of_day};
pub use free_blocks::{
    FreeBlock, FreeBlockConfig, busy_in_window, clamp_to_next_conflict, compute_free_blocks,
    next_free_block,
};
pub use reminders::{Reminder, ReminderKind, plan_reminders};
pub use repository::{InMemoryTaskRepository, RepositoryError, TaskRepository, next_star};
pub use scoring::{
    DEFAULT_MAX_SUGGESTIONS, ScoredTask, energy_fit, rank_tasks, score_task, suggest_tasks,
    time_fit, urgency,
};
pub use task::{Task, TaskUpdate, brain_dump_tasks, incomplete_tasks, starred_tasks};
pub use types::{Capacity, Effort, EnergyLevel, Importance, TaskId, ValidationError};
