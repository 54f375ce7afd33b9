//! Reminder planning.
//!
//! Works out which reminders a notification scheduler should register for the
//! current task list. Nothing here talks to a notification service; callers
//! take the plan and schedule it however their platform allows.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::task::Task;
use crate::types::TaskId;

/// Local time of the daily evening reminder.
pub const EVENING_REMINDER_TIME: (u32, u32) = (19, 30);

/// Why a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// 24 hours before a deadline.
    DayBefore,
    /// 2 hours before a deadline.
    TwoHoursBefore,
    /// At the deadline itself.
    AtDeadline,
    /// Daily nudge to fill in task details.
    Evening,
}

impl ReminderKind {
    fn lead_time(self) -> Duration {
        match self {
            Self::DayBefore => Duration::hours(24),
            Self::TwoHoursBefore => Duration::hours(2),
            Self::AtDeadline | Self::Evening => Duration::zero(),
        }
    }
}

/// A single planned notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub kind: ReminderKind,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Deadline reminders for one task that are still in the future.
///
/// Completed tasks and tasks without a deadline get none.
pub fn deadline_reminders(task: &Task, now: DateTime<Utc>) -> Vec<Reminder> {
    let Some(deadline) = task.deadline.filter(|_| task.is_eligible()) else {
        return Vec::new();
    };

    [
        ReminderKind::DayBefore,
        ReminderKind::TwoHoursBefore,
        ReminderKind::AtDeadline,
    ]
    .into_iter()
    .filter_map(|kind| {
        let fire_at = deadline - kind.lead_time();
        (fire_at > now).then(|| {
            let (title, body) = match kind {
                ReminderKind::DayBefore => (
                    "Deadline tomorrow",
                    format!("\"{}\" is due in 24 hours", task.title),
                ),
                ReminderKind::TwoHoursBefore => (
                    "Deadline soon",
                    format!("\"{}\" is due in 2 hours", task.title),
                ),
                ReminderKind::AtDeadline | ReminderKind::Evening => {
                    ("Deadline now", format!("\"{}\" is due now!", task.title))
                }
            };
            Reminder {
                task_id: Some(task.id.clone()),
                kind,
                fire_at,
                title: title.to_string(),
                body,
            }
        })
    })
    .collect()
}

/// The next evening nudge about open tasks lacking a deadline, energy and estimate.
///
/// `None` when every open task has at least one of those filled in.
pub fn evening_reminder<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Option<Reminder> {
    let count = tasks
        .iter()
        .filter(|t| t.is_eligible() && t.lacks_details())
        .count();
    if count == 0 {
        return None;
    }

    let plural = if count > 1 { "s" } else { "" };
    Some(Reminder {
        task_id: None,
        kind: ReminderKind::Evening,
        fire_at: next_evening(now)?,
        title: "Evening reminder".to_string(),
        body: format!(
            "You have {count} task{plural} without details. Take a moment to add deadlines and estimates."
        ),
    })
}

/// The next local 19:30 strictly after `now`.
fn next_evening<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let (hour, minute) = EVENING_REMINDER_TIME;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let tz = now.timezone();
    let today = now.date_naive();

    [Some(today), today.succ_opt()]
        .into_iter()
        .flatten()
        .filter_map(|day| tz.from_local_datetime(&day.and_time(time)).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .find(|dt| *dt > now.with_timezone(&Utc))
}

/// Every reminder the current task list calls for, soonest first.
pub fn plan_reminders<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<Reminder> {
    let now_utc = now.with_timezone(&Utc);
    let mut plan: Vec<Reminder> = tasks
        .iter()
        .flat_map(|t| deadline_reminders(t, now_utc))
        .collect();
    plan.extend(evening_reminder(tasks, now));
    plan.sort_by_key(|r| r.fire_at);
    tracing::debug!(reminders = plan.len(), "planned reminders");
    plan
}
