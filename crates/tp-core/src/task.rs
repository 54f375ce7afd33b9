//! Tasks and the read-only views presentation code builds from them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Effort, EnergyLevel, Importance, TaskId, ValidationError};

/// Maximum number of tasks that can be starred for a single day.
pub const MAX_STARRED: usize = 3;

/// Number of incomplete tasks shown in the brain dump.
pub const BRAIN_DUMP_LEN: usize = 10;

/// A unit of work on the user's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier.
    pub id: TaskId,
    /// What to do. Never blank.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<Effort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyLevel>,
    /// The day this task was starred as a featured priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred_for: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a task with only a title, as quick-add does.
    ///
    /// The title is trimmed; a blank title is rejected.
    pub fn new(title: &str, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: TaskId::generate(),
            title: validate_title(title)?,
            notes: None,
            created_at: now,
            deadline: None,
            estimated_minutes: None,
            importance: None,
            effort: None,
            energy: None,
            starred_for: None,
            completed_at: None,
        })
    }

    /// Whether the task can be suggested (it is not completed).
    pub const fn is_eligible(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Whether the task is one of the featured priorities for `day`.
    pub fn is_starred_for(&self, day: NaiveDate) -> bool {
        self.starred_for == Some(day)
    }

    /// Importance with the absent case defaulted to 1.
    pub fn importance_value(&self) -> u8 {
        self.importance.unwrap_or_default().value()
    }

    /// Effort with the absent case defaulted to 1.
    pub fn effort_value(&self) -> u8 {
        self.effort.unwrap_or_default().value()
    }

    /// The duration estimate, treating a zero estimate as no estimate.
    pub fn estimate(&self) -> Option<u32> {
        self.estimated_minutes.filter(|&m| m > 0)
    }

    /// Whether none of deadline, energy or estimate has been filled in.
    pub fn lacks_details(&self) -> bool {
        self.deadline.is_none() && self.energy.is_none() && self.estimate().is_none()
    }

    /// Applies a partial update. `id` and `created_at` are never touched.
    pub fn apply(&mut self, update: TaskUpdate) -> Result<(), ValidationError> {
        if let Some(title) = update.title {
            self.title = validate_title(&title)?;
        }
        if let Some(notes) = update.notes {
            self.notes = notes.filter(|n| !n.trim().is_empty());
        }
        if let Some(deadline) = update.deadline {
            self.deadline = deadline;
        }
        if let Some(estimate) = update.estimated_minutes {
            self.estimated_minutes = estimate.filter(|&m| m > 0);
        }
        if let Some(importance) = update.importance {
            self.importance = importance;
        }
        if let Some(effort) = update.effort {
            self.effort = effort;
        }
        if let Some(energy) = update.energy {
            self.energy = energy;
        }
        Ok(())
    }
}

/// A partial edit of a task.
///
/// For each optional field, `None` leaves it untouched, `Some(None)` clears it
/// and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub notes: Option<Option<String>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub estimated_minutes: Option<Option<u32>>,
    pub importance: Option<Option<Importance>>,
    pub effort: Option<Option<Effort>>,
    pub energy: Option<Option<EnergyLevel>>,
}

impl TaskUpdate {
    /// Whether applying this update would change nothing.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_none()
            && self.deadline.is_none()
            && self.estimated_minutes.is_none()
            && self.importance.is_none()
            && self.effort.is_none()
            && self.energy.is_none()
    }
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::Empty { field: "title" });
    }
    Ok(title.to_string())
}

/// Tasks that are not completed, in list order.
pub fn incomplete_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_eligible()).collect()
}

/// Incomplete tasks starred for `today`, at most [`MAX_STARRED`].
pub fn starred_tasks(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.is_eligible() && t.is_starred_for(today))
        .take(MAX_STARRED)
        .collect()
}

/// The first [`BRAIN_DUMP_LEN`] incomplete tasks.
pub fn brain_dump_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.is_eligible())
        .take(BRAIN_DUMP_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_trims_title() {
        let task = Task::new("  write report  ", now()).unwrap();
        assert_eq!(task.title, "write report");
        assert!(task.is_eligible());
        assert!(task.lacks_details());
    }

    #[test]
    fn new_rejects_blank_title() {
        let err = Task::new("   ", now()).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "title" });
    }

    #[test]
    fn defaults_are_centralized() {
        let mut task = Task::new("a", now()).unwrap();
        assert_eq!(task.importance_value(), 1);
        assert_eq!(task.effort_value(), 1);
        task.estimated_minutes = Some(0);
        assert_eq!(task.estimate(), None);
    }

    #[test]
    fn apply_sets_and_clears_fields() {
        let mut task = Task::new("a", now()).unwrap();
        let id = task.id.clone();

        task.apply(TaskUpdate {
            title: Some("b".into()),
            energy: Some(Some(EnergyLevel::High)),
            estimated_minutes: Some(Some(25)),
            ..TaskUpdate::default()
        })
        .unwrap();
        assert_eq!(task.title, "b");
        assert_eq!(task.energy, Some(EnergyLevel::High));
        assert_eq!(task.estimate(), Some(25));

        task.apply(TaskUpdate {
            energy: Some(None),
            ..TaskUpdate::default()
        })
        .unwrap();
        assert_eq!(task.energy, None);
        assert_eq!(task.estimate(), Some(25));
        assert_eq!(task.id, id);
    }

    #[test]
    fn apply_rejects_blank_title_and_keeps_old() {
        let mut task = Task::new("keep me", now()).unwrap();
        let result = task.apply(TaskUpdate {
            title: Some(" ".into()),
            ..TaskUpdate::default()
        });
        assert!(result.is_err());
        assert_eq!(task.title, "keep me");
    }

    #[test]
    fn starred_view_caps_at_three_and_skips_completed() {
        let today = now().date_naive();
        let mut tasks: Vec<Task> = (0..5)
            .map(|i| {
                let mut t = Task::new(&format!("t{i}"), now()).unwrap();
                t.starred_for = Some(today);
                t
            })
            .collect();
        tasks[0].completed_at = Some(now());

        let starred = starred_tasks(&tasks, today);
        let titles: Vec<_> = starred.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["t1", "t2", "t3"]);

        let tomorrow = today.succ_opt().unwrap();
        assert!(starred_tasks(&tasks, tomorrow).is_empty());
    }

    #[test]
    fn brain_dump_takes_first_ten_incomplete() {
        let mut tasks: Vec<Task> = (0..12)
            .map(|i| Task::new(&format!("t{i}"), now()).unwrap())
            .collect();
        tasks[1].completed_at = Some(now());

        let dump = brain_dump_tasks(&tasks);
        assert_eq!(dump.len(), 10);
        assert!(dump.iter().all(|t| t.title != "t1"));
        assert_eq!(dump[9].title, "t10");
        assert_eq!(incomplete_tasks(&tasks).len(), 11);
    }

    #[test]
    fn serde_uses_camel_case_and_skips_absent() {
        let mut task = Task::new("a", now()).unwrap();
        task.estimated_minutes = Some(15);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["estimatedMinutes"], 15);
        assert!(json.get("deadline").is_none());
        assert!(json.get("completedAt").is_none());
    }
}
