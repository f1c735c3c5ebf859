use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{JobTimeError, Result};

/// Numeric GitLab project ID.
pub type ProjectId = u64;

/// A commit as returned by `GET /projects/:id/repository/commits/:sha`.
///
/// Only the fields the resolver needs are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRecord {
    /// Parent SHAs, first parent first
    #[serde(default)]
    pub parent_ids: Vec<String>,
}

/// Lifecycle state of a job as reported by the commit status API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    /// Any state this tool doesn't know how to label
    Other(String),
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "created" => Self::Created,
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Other(value),
        }
    }
}

/// One job entry from `GET /projects/:id/repository/commits/:sha/statuses`.
#[derive(Debug, Clone)]
pub struct StatusRecord {
    pub name: String,
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StatusRecord {
    /// Converts a raw statuses response into records.
    ///
    /// The body must be a JSON array. Entries that aren't objects or carry
    /// no usable `name` are skipped. Every other entry is kept, so that the
    /// first job with a given name is always the one reported.
    pub fn list_from_value(value: Value) -> Result<Vec<Self>> {
        let Value::Array(entries) = value else {
            return Err(JobTimeError::BadResponseShape);
        };

        Ok(entries.iter().filter_map(Self::from_entry).collect())
    }

    /// Reads one entry. A `status` that isn't a string becomes
    /// `JobStatus::Other`, an unreadable timestamp becomes `None`.
    fn from_entry(entry: &Value) -> Option<Self> {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())?;

        let status = match entry.get("status") {
            Some(Value::String(status)) => JobStatus::from(status.clone()),
            other => {
                let raw = other.map_or_else(|| "missing".to_owned(), Value::to_string);
                warn!("Job {name} has no usable status ({raw})");
                JobStatus::Other(raw)
            }
        };

        Some(Self {
            name: name.to_owned(),
            status,
            started_at: timestamp(entry, name, "started_at"),
            finished_at: timestamp(entry, name, "finished_at"),
        })
    }
}

fn timestamp(entry: &Value, name: &str, field: &str) -> Option<DateTime<Utc>> {
    match entry.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => match raw.parse() {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!("Ignoring {field} '{raw}' of job {name}: {e}");
                None
            }
        },
        Some(other) => {
            warn!("Ignoring {field} {other} of job {name}: not a timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_logging::capture_logs;
    use log::Level;
    use serde_json::json;

    #[test]
    fn test_job_status_from_string() {
        assert_eq!(JobStatus::from("success".to_string()), JobStatus::Success);
        assert_eq!(JobStatus::from("canceled".to_string()), JobStatus::Canceled);
        assert_eq!(
            JobStatus::from("manual".to_string()),
            JobStatus::Other("manual".to_string())
        );
    }

    #[test]
    fn test_status_list_requires_array() {
        let result = StatusRecord::list_from_value(json!({"message": "404 Not found"}));
        assert!(matches!(result, Err(JobTimeError::BadResponseShape)));
    }

    #[test]
    fn test_status_list_skips_unusable_entries() {
        let records = StatusRecord::list_from_value(json!([
            "not an object",
            {"status": "success"},
            {"name": "", "status": "success"},
            {"name": 7, "status": "success"},
            {
                "name": "unit-tests",
                "stage": "test",
                "status": "failed",
                "started_at": "2024-01-01T00:00:00Z",
                "finished_at": "2024-01-01T00:05:30.000+00:00"
            }
        ]))
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "unit-tests");
        assert_eq!(records[0].status, JobStatus::Failed);
        assert!(records[0].finished_at.is_some());
    }

    #[test]
    fn test_status_record_allows_missing_timestamps() {
        let records = StatusRecord::list_from_value(json!([
            {"name": "build", "status": "pending", "started_at": null, "finished_at": null}
        ]))
        .unwrap();

        assert_eq!(records[0].status, JobStatus::Pending);
        assert!(records[0].started_at.is_none());
    }

    #[test]
    fn test_named_entry_with_odd_status_is_kept() {
        let (records, logs) = capture_logs(|| {
            StatusRecord::list_from_value(json!([
                {"name": "job", "status": null},
                {"name": "job", "status": 3},
                {"name": "job"},
                {"name": "job", "status": "success"}
            ]))
            .unwrap()
        });

        let statuses: Vec<_> = records.iter().map(|r| r.status.clone()).collect();
        assert_eq!(
            statuses,
            vec![
                JobStatus::Other("null".to_string()),
                JobStatus::Other("3".to_string()),
                JobStatus::Other("missing".to_string()),
                JobStatus::Success,
            ]
        );
        assert_eq!(
            logs.iter().filter(|(level, _)| *level == Level::Warn).count(),
            3
        );
    }

    #[test]
    fn test_unreadable_timestamps_become_none() {
        let (records, logs) = capture_logs(|| {
            StatusRecord::list_from_value(json!([{
                "name": "job",
                "status": "failed",
                "started_at": "yesterday",
                "finished_at": 1_704_067_200
            }]))
            .unwrap()
        });

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, JobStatus::Failed);
        assert!(records[0].started_at.is_none());
        assert!(records[0].finished_at.is_none());
        assert!(logs
            .iter()
            .any(|(level, msg)| *level == Level::Warn && msg.contains("started_at 'yesterday'")));
        assert!(logs
            .iter()
            .any(|(level, msg)| *level == Level::Warn && msg.contains("finished_at")));
    }

    #[test]
    fn test_commit_record_defaults_parents() {
        let commit: CommitRecord = serde_json::from_value(json!({"id": "abc123"})).unwrap();
        assert!(commit.parent_ids.is_empty());
    }
}
