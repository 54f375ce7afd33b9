//! Free-block calculator.
//!
//! Computes the free intervals left in a time window once calendar events are
//! taken out.
//!
//! # Algorithm Summary
//!
//! 1. Drop all-day events and events that do not overlap the window
//! 2. Sort the rest by start time
//! 3. Emit the gap before the first event (no minimum length), every gap
//!    between consecutive events and the gap after the last event (both at
//!    least `min_gap_minutes` long)
//!
//! Overlapping events are not merged by default, so gaps are measured between
//! events that are consecutive by start time. A nested event can therefore
//! open a gap that an enclosing event still covers. Set
//! [`FreeBlockConfig::merge_overlapping`] to coalesce events first.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{BusyInterval, CalendarError, CalendarSource, end_of_day};

/// Configuration for free-block calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBlockConfig {
    /// Shortest gap worth reporting between or after events.
    /// Default: 5 minutes.
    pub min_gap_minutes: i64,

    /// Coalesce overlapping events before looking for gaps.
    /// Default: false.
    pub merge_overlapping: bool,
}

impl Default for FreeBlockConfig {
    fn default() -> Self {
        Self {
            min_gap_minutes: 5,
            merge_overlapping: false,
        }
    }
}

/// A free stretch of time inside the requested window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Whole minutes between `start` and `end`, rounded down.
    pub duration_minutes: i64,
}

impl FreeBlock {
    fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration_minutes: floor_minutes(start, end),
        }
    }
}

fn floor_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().div_euclid(60_000)
}

/// Whether an interval touches the window: it starts or ends strictly inside
/// it, or spans all of it.
fn overlaps_window(
    interval: &BusyInterval,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> bool {
    let inside = |t: DateTime<Utc>| t > window_start && t < window_end;
    inside(interval.start)
        || inside(interval.end)
        || (interval.start <= window_start && interval.end >= window_end)
}

/// The timed events that block part of `[window_start, window_end)`, sorted by
/// start. Order among equal starts is preserved.
pub fn busy_in_window(
    busy: &[BusyInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<&BusyInterval> {
    let mut relevant: Vec<&BusyInterval> = busy
        .iter()
        .filter(|i| !i.all_day)
        .filter(|i| overlaps_window(i, window_start, window_end))
        .collect();
    relevant.sort_by_key(|i| i.start);
    relevant
}

/// Coalesces sorted intervals that overlap or touch.
fn merge_sorted(intervals: Vec<&BusyInterval>) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some((_, end)) if interval.start <= *end => {
                *end = (*end).max(interval.end);
            }
            _ => merged.push((interval.start, interval.end)),
        }
    }
    merged
}

impl FreeBlockConfig {
    /// Computes the free blocks of `[window_start, window_end)`, ordered by start.
    ///
    /// Returns an empty list when the window is empty or inverted.
    pub fn compute(
        &self,
        busy: &[BusyInterval],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<FreeBlock> {
        if window_end <= window_start {
            return Vec::new();
        }

        let relevant = busy_in_window(busy, window_start, window_end);

        tracing::debug!(
            total = busy.len(),
            relevant = relevant.len(),
            merge = self.merge_overlapping,
            "computing free blocks"
        );

        if relevant.is_empty() {
            return vec![FreeBlock::between(window_start, window_end)];
        }

        let spans: Vec<(DateTime<Utc>, DateTime<Utc>)> = if self.merge_overlapping {
            merge_sorted(relevant)
        } else {
            relevant.iter().map(|i| (i.start, i.end)).collect()
        };

        let mut blocks = Vec::new();

        // Leading gap has no minimum length
        if let Some(&(first_start, _)) = spans.first() {
            if first_start > window_start {
                blocks.push(FreeBlock::between(window_start, first_start));
            }
        }

        for pair in spans.windows(2) {
            let (_, current_end) = pair[0];
            let (next_start, _) = pair[1];
            if current_end < next_start {
                let block = FreeBlock::between(current_end, next_start);
                if block.duration_minutes >= self.min_gap_minutes {
                    blocks.push(block);
                }
            }
        }

        if let Some(&(_, last_end)) = spans.last() {
            if last_end < window_end {
                let block = FreeBlock::between(last_end, window_end);
                if block.duration_minutes >= self.min_gap_minutes {
                    blocks.push(block);
                }
            }
        }

        blocks
    }
}

/// Computes free blocks with the default configuration.
pub fn compute_free_blocks(
    busy: &[BusyInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<FreeBlock> {
    FreeBlockConfig::default().compute(busy, window_start, window_end)
}

/// The first free block between `now` and the end of its calendar day.
///
/// A calendar without access counts as empty, so the rest of the day is free.
pub fn next_free_block<S, Tz>(
    source: &S,
    now: &DateTime<Tz>,
    config: &FreeBlockConfig,
) -> Result<Option<FreeBlock>, CalendarError>
where
    S: CalendarSource + ?Sized,
    Tz: TimeZone,
{
    let start = now.with_timezone(&Utc);
    let end = end_of_day(now);
    let snapshot = source.busy_intervals(start, end)?;
    if !snapshot.access_granted {
        tracing::debug!("calendar access not granted; treating day as free");
    }
    Ok(config
        .compute(snapshot.usable_intervals(), start, end)
        .into_iter()
        .next())
}

/// Shrinks `requested_minutes` so it ends before the next calendar conflict.
///
/// Returns `requested_minutes` unchanged when there is no free block today or
/// the calendar cannot be read; failures are logged, never returned.
pub fn clamp_to_next_conflict<S, Tz>(
    requested_minutes: i64,
    source: &S,
    now: &DateTime<Tz>,
    config: &FreeBlockConfig,
) -> i64
where
    S: CalendarSource + ?Sized,
    Tz: TimeZone,
{
    match next_free_block(source, now, config) {
        Ok(Some(block)) => requested_minutes.min(block.duration_minutes),
        Ok(None) => requested_minutes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read calendar; using requested minutes");
            requested_minutes
        }
    }
}
