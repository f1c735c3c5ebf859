use futures::FutureExt;
use log::debug;
use serde_json::Value;

use super::core::{endpoint, fetch_json, GitLabClient};
use crate::auth::Token;
use crate::error::{JobTimeError, Result};
use crate::providers::gitlab::types::{CommitRecord, ProjectId, StatusRecord};

impl GitLabClient {
    /// Converts a project path (`group/project`) into its numeric ID.
    ///
    /// At most one request is made per namespace for the life of the client:
    /// concurrent callers share the lookup that is already running, later
    /// callers get its result.
    pub async fn get_project_id(&self, namespace: &str, token: &Token) -> Result<ProjectId> {
        let encoded = urlencoding::encode(namespace).into_owned();

        let pending = self.project_ids.get_or_start(&encoded, || {
            let resource = format!("/projects/{encoded}/");
            let url = endpoint(&self.host, &format!("api/v4{resource}"));
            let client = self.client.clone();
            let token = token.clone();

            async move {
                let data = fetch_json(client, url?, token).await?;
                project_id_from(&data, &resource)
            }
            .boxed()
        });

        pending.await
    }

    /// Fetches a single commit.
    ///
    /// See <https://docs.gitlab.com/ee/api/commits.html#get-a-single-commit>
    pub async fn get_commit(&self, sha: &str, project: ProjectId, token: &Token) -> Result<CommitRecord> {
        let resource = format!("/projects/{project}/repository/commits/{sha}");
        let data = self
            .get_json(&format!("api/v4{resource}"), token, None)
            .await?;

        if data.is_null() {
            return Err(JobTimeError::MissingData(resource));
        }

        Ok(serde_json::from_value(data)?)
    }

    /// Fetches the CI job statuses recorded for a commit.
    ///
    /// `stage` and `name` are forwarded as query filters when present. GitLab
    /// may still return jobs that don't match them, so callers match by name.
    ///
    /// See <https://docs.gitlab.com/ee/api/commits.html#list-the-statuses-of-a-commit>
    pub async fn get_commit_status(
        &self,
        sha: &str,
        project: ProjectId,
        token: &Token,
        stage: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<StatusRecord>> {
        let mut url = endpoint(
            &self.host,
            &format!("api/v4/projects/{project}/repository/commits/{sha}/statuses"),
        )?;

        let filters: Vec<(&str, &str)> = [("stage", stage), ("name", name)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();

        if !filters.is_empty() {
            url.query_pairs_mut().extend_pairs(filters);
        }

        let data = fetch_json(self.client.clone(), url, token.clone()).await?;
        StatusRecord::list_from_value(data)
    }
}

fn project_id_from(data: &Value, resource: &str) -> Result<ProjectId> {
    if data.is_null() {
        return Err(JobTimeError::MissingData(resource.to_owned()));
    }

    match data.get("id").and_then(Value::as_u64) {
        Some(id) if id != 0 => Ok(id),
        _ => {
            debug!("Project response without an ID: {data}");
            Err(JobTimeError::MissingField {
                endpoint: resource.to_owned(),
                field: "project ID",
            })
        }
    }
}
