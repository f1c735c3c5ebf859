use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Wall-clock time a job took, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(i64);

impl Elapsed {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.max(0))
    }

    /// Span between two timestamps. A missing start counts as zero.
    pub fn between(started_at: Option<DateTime<Utc>>, finished_at: DateTime<Utc>) -> Self {
        let millis = started_at
            .map(|start| (finished_at - start).num_milliseconds())
            .unwrap_or(0);
        Self::from_millis(millis)
    }

    #[cfg(test)]
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_time(self.0))
    }
}

impl Serialize for Elapsed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses `MM:SS` or `H:MM:SS` back into an elapsed time.
impl FromStr for Elapsed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(':')
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|e| format!("Invalid time component '{part}' in '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let seconds = match parts.as_slice() {
            [minutes, seconds] => minutes * 60 + seconds,
            [hours, minutes, seconds] => hours * 3600 + minutes * 60 + seconds,
            _ => return Err(format!("Expected MM:SS or H:MM:SS, got '{s}'")),
        };

        Ok(Self::from_millis(seconds * 1000))
    }
}

/// Formats a duration in milliseconds as `MM:SS`, or `H:MM:SS` from one hour up.
///
/// Milliseconds round to the nearest second; minutes and hours are whole
/// units of what is left. Hours are not padded.
pub fn format_time(millis: i64) -> String {
    let total_seconds = (millis.max(0) + 500) / 1000;
    let seconds = total_seconds % 60;
    let total_minutes = total_seconds / 60;

    if total_minutes < 60 {
        return format!("{total_minutes:02}:{seconds:02}");
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}
