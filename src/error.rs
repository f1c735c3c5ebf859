use std::sync::Arc;

use thiserror::Error;

/// Errors raised while resolving the last run of a job.
///
/// Cloneable so that one in-flight project lookup can hand the same
/// outcome to every caller waiting on it.
#[derive(Error, Debug, Clone)]
pub enum JobTimeError {
    #[error("HTTP request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(Arc<reqwest::Error>),

    #[error("JSON parse error: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("GitLab didn't return data in 'GET {0}'")]
    MissingData(String),

    #[error("GitLab didn't return a {field} in 'GET {endpoint}'")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },

    #[error("Couldn't figure out what the current commit is (run with RUST_LOG=debug for details)")]
    NoCommit,

    #[error("Couldn't find parent commits for {0}")]
    NoParent(String),

    #[error("Expected to get an array of job statuses")]
    BadResponseShape,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for JobTimeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(Arc::new(err))
    }
}

impl From<serde_json::Error> for JobTimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, JobTimeError>;
