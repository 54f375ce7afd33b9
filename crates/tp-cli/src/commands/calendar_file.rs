//! Calendar source backed by a JSON file of busy intervals.
//!
//! The file holds either a plain array of intervals or a full snapshot object
//! (`{"accessGranted": false, "intervals": [...]}`). A missing file means no
//! calendar was shared, which the free-block code treats as an empty day.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tp_core::{BusyInterval, CalendarError, CalendarSnapshot, CalendarSource};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CalendarFileContents {
    Intervals(Vec<BusyInterval>),
    Snapshot(CalendarSnapshot),
}

/// Reads busy intervals from a JSON file on every request.
#[derive(Debug, Clone)]
pub struct CalendarFile {
    path: PathBuf,
}

impl CalendarFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CalendarSource for CalendarFile {
    fn busy_intervals(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no calendar file");
                return Ok(CalendarSnapshot::denied());
            }
            Err(e) => {
                return Err(CalendarError::Unavailable(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };

        let contents: CalendarFileContents = serde_json::from_str(&content)
            .map_err(|e| CalendarError::Malformed(format!("{}: {e}", self.path.display())))?;
        let snapshot = match contents {
            CalendarFileContents::Intervals(intervals) => CalendarSnapshot::granted(intervals),
            CalendarFileContents::Snapshot(snapshot) => snapshot,
        };
        tracing::debug!(
            path = %self.path.display(),
            access_granted = snapshot.access_granted,
            intervals = snapshot.intervals.len(),
            "read calendar file"
        );
        Ok(snapshot)
    }
}
