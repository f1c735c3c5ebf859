use std::fmt;

use log::error;
use serde::Serialize;

use super::elapsed::Elapsed;
use super::types::{JobStatus, StatusRecord};

/// What the previous run of a job ended up as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "elapsed", rename_all = "snake_case")]
pub enum Outcome {
    Running,
    Succeeded(Elapsed),
    Failed(Elapsed),
    Canceled(Elapsed),
    /// The job exists but its status isn't one this tool labels
    Unknown,
    /// Nothing could be determined; details went to the log
    Unresolvable,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Last pipeline running"),
            Self::Succeeded(elapsed) => write!(f, "Previously took {elapsed}"),
            Self::Failed(elapsed) => write!(f, "Previously failed after {elapsed}"),
            Self::Canceled(elapsed) => write!(f, "Previously canceled after {elapsed}"),
            Self::Unknown => write!(f, "Unknown job status"),
            Self::Unresolvable => write!(f, "Last build time unavailable"),
        }
    }
}

/// Picks the first record named `name` and classifies it.
///
/// Returns `None` when no record carries that name. Later records with the
/// same name are ignored.
pub fn resolve(records: &[StatusRecord], name: &str) -> Option<Outcome> {
    records
        .iter()
        .find(|record| record.name == name)
        .map(classify)
}

fn classify(record: &StatusRecord) -> Outcome {
    let terminal = match &record.status {
        JobStatus::Created | JobStatus::Pending | JobStatus::Running => return Outcome::Running,
        JobStatus::Other(status) => {
            error!("Unknown job status: {status}");
            return Outcome::Unknown;
        }
        JobStatus::Success => Outcome::Succeeded,
        JobStatus::Failed => Outcome::Failed,
        JobStatus::Canceled => Outcome::Canceled,
    };

    // still being written by GitLab
    let Some(finished_at) = record.finished_at else {
        return Outcome::Running;
    };

    terminal(Elapsed::between(record.started_at, finished_at))
}
