//! Free command for listing free blocks between calendar events.

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use serde::Serialize;
use tp_core::{BusyInterval, CalendarSnapshot, CalendarSource, FreeBlock, busy_in_window};

use super::calendar_file::CalendarFile;
use super::util::{format_local, format_minutes, parse_datetime};
use crate::Config;

#[derive(Debug, Default, Args)]
pub struct FreeArgs {
    /// Start of the window (default: now).
    #[arg(long)]
    pub start: Option<String>,

    /// End of the window (default: start plus `window_hours` from the config).
    #[arg(long)]
    pub end: Option<String>,

    /// Also list the calendar events that fall inside the window.
    #[arg(long)]
    pub events: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON output structure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFreeBlocks {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub access_granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_error: Option<String>,
    pub blocks: Vec<FreeBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<BusyInterval>>,
}

/// Format free blocks for human-readable output.
pub fn format_free_blocks<Tz>(free: &JsonFreeBlocks, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut lines = vec![format!(
        "FREE TIME {} to {}",
        format_local(free.window_start, tz),
        format_local(free.window_end, tz)
    )];
    if free.calendar_error.is_some() {
        lines.push("Calendar could not be read; treating the whole window as free.".to_string());
    } else if !free.access_granted {
        lines.push("No calendar shared; treating the whole window as free.".to_string());
    }
    lines.push(String::new());

    if free.blocks.is_empty() {
        lines.push("No free blocks.".to_string());
    }
    for block in &free.blocks {
        lines.push(format!(
            "{}  {}  {:>7}",
            format_local(block.start, tz),
            format_local(block.end, tz),
            format_minutes(block.duration_minutes)
        ));
    }

    if let Some(events) = &free.events {
        lines.push(String::new());
        lines.push("BUSY".to_string());
        if events.is_empty() {
            lines.push("No events.".to_string());
        }
        for event in events {
            lines.push(format!(
                "{}  {}  {}",
                format_local(event.start, tz),
                format_local(event.end, tz),
                event.title
            ));
        }
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

pub fn run<W, Tz>(
    writer: &mut W,
    args: &FreeArgs,
    config: &Config,
    now: &DateTime<Tz>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let window_start = match &args.start {
        Some(s) => parse_datetime(s, now).context("invalid --start")?,
        None => now.with_timezone(&Utc),
    };
    let window_end = match &args.end {
        Some(s) => parse_datetime(s, now).context("invalid --end")?,
        None => Duration::try_hours(config.window_hours)
            .and_then(|hours| window_start.checked_add_signed(hours))
            .with_context(|| format!("window_hours {} is out of range", config.window_hours))?,
    };
    if window_end <= window_start {
        bail!("window end must be after its start");
    }

    let calendar = CalendarFile::new(&config.calendar_path);
    let (snapshot, calendar_error) = match calendar.busy_intervals(window_start, window_end) {
        Ok(snapshot) => (snapshot, None),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read calendar; treating window as free");
            (CalendarSnapshot::denied(), Some(e.to_string()))
        }
    };
    let busy = snapshot.usable_intervals();
    let blocks = config.free_blocks().compute(busy, window_start, window_end);
    let events = args.events.then(|| {
        busy_in_window(busy, window_start, window_end)
            .into_iter()
            .cloned()
            .collect()
    });

    let free = JsonFreeBlocks {
        window_start,
        window_end,
        access_granted: snapshot.access_granted,
        calendar_error,
        blocks,
        events,
    };
    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&free)?)?;
    } else {
        write!(writer, "{}", format_free_blocks(&free, &now.timezone()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            database_path: dir.join("tp.db"),
            calendar_path: dir.join("calendar.json"),
            ..Config::default()
        }
    }

    fn free(args: &FreeArgs, config: &Config) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, args, config, &now())?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn free_without_calendar_is_whole_window() {
        let temp = tempfile::tempdir().unwrap();
        let output = free(&FreeArgs::default(), &test_config(temp.path())).unwrap();
        assert_snapshot!(output, @r"
        FREE TIME 2026-03-02 09:00 to 2026-03-02 21:00
        No calendar shared; treating the whole window as free.

        2026-03-02 09:00  2026-03-02 21:00      12h
        ");
    }

    #[test]
    fn free_between_events() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        std::fs::write(
            &config.calendar_path,
            r#"[
                {"title": "standup", "start": "2026-03-02T10:00:00Z", "end": "2026-03-02T10:30:00Z"},
                {"title": "review", "start": "2026-03-02T10:34:00Z", "end": "2026-03-02T12:00:00Z"},
                {"title": "offsite", "start": "2026-03-02T00:00:00Z", "end": "2026-03-03T00:00:00Z", "allDay": true}
            ]"#,
        )
        .unwrap();

        let args = FreeArgs {
            end: Some("2026-03-02T13:00:00Z".into()),
            ..FreeArgs::default()
        };
        assert_snapshot!(free(&args, &config).unwrap(), @r"
        FREE TIME 2026-03-02 09:00 to 2026-03-02 13:00

        2026-03-02 09:00  2026-03-02 10:00       1h
        2026-03-02 12:00  2026-03-02 13:00       1h
        ");
    }

    #[test]
    fn free_json() {
        let temp = tempfile::tempdir().unwrap();
        let args = FreeArgs {
            start: Some("2026-03-02T09:00:00Z".into()),
            end: Some("in 30 minutes".into()),
            json: true,
            ..FreeArgs::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&free(&args, &test_config(temp.path())).unwrap()).unwrap();
        assert_eq!(value["accessGranted"], false);
        assert_eq!(value["blocks"][0]["durationMinutes"], 30);
        assert!(value.get("events").is_none());
        assert!(value.get("calendarError").is_none());
    }

    #[test]
    fn free_rejects_inverted_window() {
        let temp = tempfile::tempdir().unwrap();
        let args = FreeArgs {
            start: Some("in 2 hours".into()),
            end: Some("in 1 hour".into()),
            ..FreeArgs::default()
        };
        assert!(free(&args, &test_config(temp.path())).is_err());
    }

    #[test]
    fn free_rejects_out_of_range_window_hours() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            window_hours: 100_000_000_000,
            ..test_config(temp.path())
        };
        let err = free(&FreeArgs::default(), &config).unwrap_err();
        assert!(err.to_string().contains("window_hours"));
    }

    #[test]
    fn free_treats_malformed_calendar_as_free() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        std::fs::write(&config.calendar_path, "[{").unwrap();
        let args = FreeArgs {
            end: Some("in 2 hours".into()),
            ..FreeArgs::default()
        };
        assert_snapshot!(free(&args, &config).unwrap(), @r"
        FREE TIME 2026-03-02 09:00 to 2026-03-02 11:00
        Calendar could not be read; treating the whole window as free.

        2026-03-02 09:00  2026-03-02 11:00       2h
        ");
    }

    #[test]
    fn free_json_reports_unreadable_calendar() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            calendar_path: temp.path().to_path_buf(),
            ..test_config(temp.path())
        };
        let args = FreeArgs {
            end: Some("in 1 hour".into()),
            json: true,
            ..FreeArgs::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&free(&args, &config).unwrap()).unwrap();
        assert_eq!(value["accessGranted"], false);
        assert!(value["calendarError"].as_str().unwrap().contains("unavailable"));
        assert_eq!(value["blocks"][0]["durationMinutes"], 60);
    }

    #[test]
    fn free_lists_events_in_window() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        std::fs::write(
            &config.calendar_path,
            r#"[
                {"title": "review", "start": "2026-03-02T10:34:00Z", "end": "2026-03-02T12:00:00Z"},
                {"title": "breakfast", "start": "2026-03-02T08:00:00Z", "end": "2026-03-02T09:00:00Z"},
                {"title": "standup", "start": "2026-03-02T10:00:00Z", "end": "2026-03-02T10:30:00Z"},
                {"title": "offsite", "start": "2026-03-02T00:00:00Z", "end": "2026-03-03T00:00:00Z", "allDay": true}
            ]"#,
        )
        .unwrap();

        let args = FreeArgs {
            end: Some("2026-03-02T13:00:00Z".into()),
            events: true,
            ..FreeArgs::default()
        };
        assert_snapshot!(free(&args, &config).unwrap(), @r"
        FREE TIME 2026-03-02 09:00 to 2026-03-02 13:00

        2026-03-02 09:00  2026-03-02 10:00       1h
        2026-03-02 12:00  2026-03-02 13:00       1h

        BUSY
        2026-03-02 10:00  2026-03-02 10:30  standup
        2026-03-02 10:34  2026-03-02 12:00  review
        ");
    }

    #[test]
    fn free_json_events_without_calendar_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let args = FreeArgs {
            events: true,
            json: true,
            ..FreeArgs::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&free(&args, &test_config(temp.path())).unwrap()).unwrap();
        assert_eq!(value["events"], serde_json::json!([]));
    }
}
