//! Shared utilities for CLI commands.

use std::fmt;
use std::sync::LazyLock;

use anyhow::{Context, bail};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use tp_core::{Task, TaskId};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(in)\s+)?(\d+)\s+(minute|hour|day|week)s?(?:\s+(ago))?$")
        .unwrap_or_else(|e| unreachable!("relative time pattern is valid: {e}"))
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Characters of a task ID shown in listings.
pub const SHORT_ID_LEN: usize = 8;

/// Parse a datetime string relative to `now`.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - A date, meaning midnight in `now`'s time zone: "2026-01-15"
/// - Future: "in 2 hours", "in 3 days"
/// - Past: "2 hours ago", "30 minutes ago"
pub fn parse_datetime<Tz: TimeZone>(s: &str, now: &DateTime<Tz>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_time(NaiveTime::MIN);
        return now
            .timezone()
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("{s} has no local midnight"));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z), a date (2026-01-15) or relative (e.g., 'in 2 hours', '2 hours ago')"
        );
    };

    let future = caps.get(1).is_some();
    let past = caps.get(4).is_some();
    if future == past {
        bail!("Invalid datetime: {s}. Use either 'in N units' or 'N units ago'");
    }

    let n: i64 = caps[2]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[3] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        bail!("Relative time value too large: {n} {}", &caps[3]);
    }

    let duration = Duration::minutes(n * minutes_per_unit);
    let now = now.with_timezone(&Utc);
    Ok(if future { now + duration } else { now - duration })
}

/// Finds the task a user meant by a full ID or a unique ID prefix.
pub fn resolve_task_id(tasks: &[Task], query: &str) -> anyhow::Result<TaskId> {
    let query = query.trim();
    if query.is_empty() {
        bail!("task ID cannot be empty");
    }

    if let Some(task) = tasks.iter().find(|t| t.id.as_str() == query) {
        return Ok(task.id.clone());
    }

    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.id.as_str().starts_with(query))
        .collect();
    match matches.as_slice() {
        [] => bail!("task not found: {query}"),
        [task] => Ok(task.id.clone()),
        _ => bail!(
            "task ID prefix {query} is ambiguous ({} matches)",
            matches.len()
        ),
    }
}

/// The leading characters of a task ID, for display.
pub fn short_id(id: &TaskId) -> &str {
    let id = id.as_str();
    id.char_indices()
        .nth(SHORT_ID_LEN)
        .map_or(id, |(end, _)| &id[..end])
}

/// Formats an instant as local wall-clock time in `tz`.
pub fn format_local<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant
        .with_timezone(tz)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// One-line summary of the optional details set on a task.
pub fn describe_task<Tz>(task: &Task, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut parts = Vec::new();
    if let Some(deadline) = task.deadline {
        parts.push(format!("due {}", format_local(deadline, tz)));
    }
    if let Some(minutes) = task.estimate() {
        parts.push(format_minutes(i64::from(minutes)));
    }
    if let Some(importance) = task.importance {
        parts.push(format!("importance {importance}"));
    }
    if let Some(effort) = task.effort {
        parts.push(format!("effort {effort}"));
    }
    if let Some(energy) = task.energy {
        parts.push(format!("{energy} energy"));
    }
    parts.join(", ")
}

/// Formats a minute count as "1h 30m", "45m" or "2h".
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.unsigned_abs();
    let hours = minutes / 60;
    let mins = minutes % 60;

    match (hours, mins) {
        (0, m) => format!("{sign}{m}m"),
        (h, 0) => format!("{sign}{h}h"),
        (h, m) => format!("{sign}{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        let dt = parse_datetime("2026-03-05T17:00:00+01:00", &now()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 5, 16, 0, 0).unwrap());
    }

    #[test]
    fn parses_date_as_local_midnight() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = now().with_timezone(&plus_two);
        let dt = parse_datetime("2026-03-05", &local_now).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 4, 22, 0, 0).unwrap());
    }

    #[test]
    fn parses_relative_future_and_past() {
        assert_eq!(
            parse_datetime("in 2 hours", &now()).unwrap(),
            now() + Duration::hours(2)
        );
        assert_eq!(
            parse_datetime("in 1 week", &now()).unwrap(),
            now() + Duration::weeks(1)
        );
        assert_eq!(
            parse_datetime("30 minutes ago", &now()).unwrap(),
            now() - Duration::minutes(30)
        );
    }

    #[test]
    fn rejects_bad_datetimes() {
        assert!(parse_datetime("tomorrow-ish", &now()).is_err());
        assert!(parse_datetime("in 2 hours ago", &now()).is_err());
        assert!(parse_datetime("2 hours", &now()).is_err());
        assert!(parse_datetime("in 99999999999 weeks", &now()).is_err());
    }

    #[test]
    fn resolves_unique_prefixes() {
        let mut a = Task::new("a", now()).unwrap();
        a.id = TaskId::new("abc123").unwrap();
        let mut b = Task::new("b", now()).unwrap();
        b.id = TaskId::new("abd456").unwrap();
        let tasks = vec![a, b];

        assert_eq!(resolve_task_id(&tasks, "abc").unwrap().as_str(), "abc123");
        assert_eq!(
            resolve_task_id(&tasks, "abd456").unwrap().as_str(),
            "abd456"
        );
        assert!(resolve_task_id(&tasks, "ab").is_err());
        assert!(resolve_task_id(&tasks, "zzz").is_err());
        assert!(resolve_task_id(&tasks, " ").is_err());
    }

    #[test]
    fn short_id_truncates() {
        let id = TaskId::new("0123456789abcdef").unwrap();
        assert_eq!(short_id(&id), "01234567");
        let short = TaskId::new("abc").unwrap();
        assert_eq!(short_id(&short), "abc");
    }

    #[test]
    fn describes_task_details() {
        let mut task = Task::new("write", now()).unwrap();
        assert_eq!(describe_task(&task, &Utc), "");

        task.deadline = Some(now() + Duration::days(1));
        task.estimated_minutes = Some(90);
        task.importance = Some(tp_core::Importance::MAX);
        task.energy = Some(tp_core::EnergyLevel::High);
        assert_eq!(
            describe_task(&task, &Utc),
            "due 2026-03-03 09:00, 1h 30m, importance 3, high energy"
        );
    }

    #[test]
    fn formats_minutes() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(-15), "-15m");
    }
}
