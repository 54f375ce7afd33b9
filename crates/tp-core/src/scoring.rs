//! Task suggestion engine.
//!
//! Ranks the user's open tasks for "I have N minutes and this much energy".
//!
//! # Algorithm Summary
//!
//! 1. Drop completed tasks
//! 2. Prefer tasks whose estimate fits the available minutes; if none fit,
//!    fall back to every open task
//! 3. Score each candidate and stable-sort descending, so ties keep list order
//! 4. Keep the first `max_suggestions`
//!
//! The composite score is
//!
//! ```text
//! 1.0 + 0.8 * importance + 1.0 * urgency + 0.8 * energy_fit + 0.6 * time_fit - 0.2 * (effort - 1)
//! ```
//!
//! with missing importance and effort read as 1.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::task::Task;
use crate::types::{Capacity, EnergyLevel};

const BASE_SCORE: f64 = 1.0;
const IMPORTANCE_WEIGHT: f64 = 0.8;
const URGENCY_WEIGHT: f64 = 1.0;
const ENERGY_WEIGHT: f64 = 0.8;
const TIME_WEIGHT: f64 = 0.6;
const EFFORT_PENALTY: f64 = 0.2;

/// Urgency of a task with no deadline.
pub const NO_DEADLINE_URGENCY: f64 = 0.8;
/// Energy fit of a task with no energy level.
pub const UNKNOWN_ENERGY_FIT: f64 = 0.4;
/// Time fit of a task with no estimate.
pub const NO_ESTIMATE_TIME_FIT: f64 = 0.8;

const MAX_URGENCY: f64 = 2.0;
const MIN_URGENCY_DAYS: f64 = 0.5;
const FITS_BONUS: f64 = 0.1;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Default length of a suggestion list.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// How well a task's required energy matches the user's capacity.
///
/// A fixed lookup table; a task with no energy level is treated as a poor
/// match rather than a neutral one.
pub const fn energy_fit(capacity: Capacity, energy: Option<EnergyLevel>) -> f64 {
    let Some(energy) = energy else {
        return UNKNOWN_ENERGY_FIT;
    };
    match (capacity, energy) {
        (Capacity::Low, EnergyLevel::Low)
        | (Capacity::Med, EnergyLevel::Low | EnergyLevel::Med)
        | (Capacity::High, EnergyLevel::High) => 1.0,
        (Capacity::Low | Capacity::High, EnergyLevel::Med)
        | (Capacity::Med, EnergyLevel::High) => 0.7,
        (Capacity::Low, EnergyLevel::High) | (Capacity::High, EnergyLevel::Low) => 0.4,
    }
}

/// Deadline pressure: `1 / days_left`, saturating at 2.0 from half a day out.
///
/// Overdue tasks saturate too.
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond deltas between task dates are far below 2^52"
)]
pub fn urgency(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(deadline) = deadline else {
        return NO_DEADLINE_URGENCY;
    };
    let days = ((deadline - now).num_milliseconds() as f64 / MS_PER_DAY).max(MIN_URGENCY_DAYS);
    (1.0 / days).min(MAX_URGENCY)
}

/// How well a task's estimate fits the available minutes, at most 1.1.
///
/// Zero or negative `available_minutes` is accepted and simply scores low; the
/// result only drops below 0.0 when `available_minutes` is negative.
#[expect(
    clippy::cast_precision_loss,
    reason = "minute counts are far below 2^52"
)]
pub fn time_fit(available_minutes: i64, estimated_minutes: Option<u32>) -> f64 {
    let Some(estimate) = estimated_minutes.filter(|&m| m > 0) else {
        return NO_ESTIMATE_TIME_FIT;
    };
    let ratio = available_minutes as f64 / f64::from(estimate.max(1));
    let base = ratio.min(1.0);
    let bonus = if i64::from(estimate) <= available_minutes {
        FITS_BONUS
    } else {
        0.0
    };
    base + bonus
}

/// Composite priority score for a single task. Higher is better.
pub fn score_task(
    task: &Task,
    capacity: Capacity,
    available_minutes: i64,
    now: DateTime<Utc>,
) -> f64 {
    let importance = f64::from(task.importance_value());
    let effort = f64::from(task.effort_value());

    BASE_SCORE + IMPORTANCE_WEIGHT * importance + URGENCY_WEIGHT * urgency(task.deadline, now)
        + ENERGY_WEIGHT * energy_fit(capacity, task.energy)
        + TIME_WEIGHT * time_fit(available_minutes, task.estimate())
        - EFFORT_PENALTY * (effort - 1.0)
}

/// A suggested task together with the score that placed it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredTask<'a> {
    pub task: &'a Task,
    pub score: f64,
}

/// Whether a task's estimate fits in the available time.
///
/// Tasks without an estimate always fit.
fn fits_time(task: &Task, available_minutes: i64) -> bool {
    task.estimate()
        .is_none_or(|m| i64::from(m) <= available_minutes)
}

/// Ranks open tasks and returns the best `max_suggestions` with their scores.
///
/// Never returns an empty list merely because nothing fits the clock: the
/// time filter is dropped when it would eliminate every open task.
pub fn rank_tasks(
    tasks: &[Task],
    capacity: Capacity,
    available_minutes: i64,
    max_suggestions: usize,
    now: DateTime<Utc>,
) -> Vec<ScoredTask<'_>> {
    if max_suggestions == 0 {
        return Vec::new();
    }

    let eligible: Vec<&Task> = tasks.iter().filter(|t| t.is_eligible()).collect();
    let fitting: Vec<&Task> = eligible
        .iter()
        .copied()
        .filter(|t| fits_time(t, available_minutes))
        .collect();

    let fallback = fitting.is_empty();
    tracing::debug!(
        total = tasks.len(),
        eligible = eligible.len(),
        fitting = fitting.len(),
        fallback,
        "selected suggestion candidates"
    );
    let candidates = if fallback { eligible } else { fitting };

    let mut scored: Vec<ScoredTask<'_>> = candidates
        .into_iter()
        .map(|task| ScoredTask {
            task,
            score: score_task(task, capacity, available_minutes, now),
        })
        .collect();

    // sort_by is stable: equal scores keep list order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(max_suggestions);
    scored
}

/// The best-fit tasks for the given capacity and time, best first.
pub fn suggest_tasks(
    tasks: &[Task],
    capacity: Capacity,
    available_minutes: i64,
    max_suggestions: usize,
    now: DateTime<Utc>,
) -> Vec<&Task> {
    rank_tasks(tasks, capacity, available_minutes, max_suggestions, now)
        .into_iter()
        .map(|s| s.task)
        .collect()
}
