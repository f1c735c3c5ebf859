use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::debug;

use crate::error::Result;
use crate::providers::gitlab::types::ProjectId;

/// A project ID lookup that may still be in flight.
///
/// Cloning it is cheap; every clone resolves to the same result.
pub type PendingProjectId = Shared<BoxFuture<'static, Result<ProjectId>>>;

/// Namespace to project ID cache for the lifetime of a client.
///
/// Stores the lookup itself rather than its result, so callers that arrive
/// while a lookup is running await that one instead of starting another.
/// Entries are never invalidated, and a failed lookup stays failed.
#[derive(Default)]
pub struct ProjectIdCache {
    entries: Mutex<HashMap<String, PendingProjectId>>,
}

impl ProjectIdCache {
    /// Returns the lookup for `key`, starting it with `start` if there is none yet.
    ///
    /// The check and the insert happen under one lock and before anything
    /// is awaited.
    pub fn get_or_start<F>(&self, key: &str, start: F) -> PendingProjectId
    where
        F: FnOnce() -> BoxFuture<'static, Result<ProjectId>>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(pending) = entries.get(key) {
            debug!("Project ID cache hit for {key}");
            return pending.clone();
        }

        let pending = start().shared();
        entries.insert(key.to_owned(), pending.clone());
        pending
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
