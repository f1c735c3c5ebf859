use log::{debug, error, info, warn};

use crate::auth::{Token, TokenProvider};
use crate::error::{JobTimeError, Result};
use crate::page::{JobContext, PageContext};
use crate::providers::gitlab::client::GitLabClient;

use super::status::{self, Outcome};

/// Result of one resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Something to show for the row, `Outcome::Unresolvable` on any failure
    Resolved(Outcome),
    /// The page doesn't say which commit it is about; nothing was requested
    NoCommit,
    /// No token was available or given; nothing was requested
    NoToken,
}

/// GitLab last-run provider.
///
/// Answers "how did this job do last time?" for rows of a pipeline page by
/// looking up the same job on the first parent of the page's commit. The
/// client, and with it the project ID cache, is shared by every run.
pub struct GitLabProvider {
    pub client: GitLabClient,
    pub project_path: String,
}

impl GitLabProvider {
    /// Creates a new GitLab provider for the specified project.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitLab instance base URL (e.g., <https://gitlab.com>)
    /// * `project_path` - Project path (e.g., "group/project")
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL can't be parsed.
    pub fn new(base_url: &str, project_path: String) -> Result<Self> {
        let client = GitLabClient::new(base_url)?;

        Ok(Self {
            client,
            project_path,
        })
    }

    /// Resolves the previous run of the job described by `context`.
    ///
    /// A missing commit stops the run before any request is made. Without a
    /// token the provider asks `tokens` to prompt for one, and does nothing
    /// if that fails too. Every other failure is logged and reported as
    /// `Outcome::Unresolvable`.
    pub async fn resolve<T>(&self, context: &PageContext, tokens: &T) -> Resolution
    where
        T: TokenProvider + ?Sized,
    {
        let Some(commit) = context.commit.as_deref() else {
            warn!("Couldn't figure out what the current commit is");
            return Resolution::NoCommit;
        };

        let Some(token) = tokens.token().or_else(|| tokens.prompt_for_token()) else {
            info!("No GitLab token available, skipping");
            return Resolution::NoToken;
        };

        match self.resolve_outcome(commit, &context.job, &token).await {
            Ok(Some(outcome)) => Resolution::Resolved(outcome),
            Ok(None) => {
                debug!(
                    "No status named {:?} on the parent of {commit}",
                    context.job.name
                );
                Resolution::Resolved(Outcome::Unresolvable)
            }
            Err(e) => {
                error!("Failed to resolve last run of {:?}: {e}", context.job.name);
                Resolution::Resolved(Outcome::Unresolvable)
            }
        }
    }

    async fn resolve_outcome(
        &self,
        commit: &str,
        job: &JobContext,
        token: &Token,
    ) -> Result<Option<Outcome>> {
        let project = self
            .client
            .get_project_id(&self.project_path, token)
            .await?;

        let record = self.client.get_commit(commit, project, token).await?;
        debug!("Got commit {commit}");

        let parent = record
            .parent_ids
            .first()
            .ok_or_else(|| JobTimeError::NoParent(commit.to_owned()))?;
        debug!(
            "Found {} parents for {commit}. Using {parent}.",
            record.parent_ids.len()
        );

        let statuses = self
            .client
            .get_commit_status(
                parent,
                project,
                token,
                job.stage.as_deref(),
                job.name.as_deref(),
            )
            .await?;

        Ok(job
            .name
            .as_deref()
            .and_then(|name| status::resolve(&statuses, name)))
    }
}
