use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use super::cache::ProjectIdCache;
use crate::auth::Token;
use crate::error::{JobTimeError, Result};

pub const DEFAULT_HOST: &str = "https://gitlab.com";

/// Header GitLab reads the personal access token from.
const PRIVATE_TOKEN_HEADER: &str = "PRIVATE_TOKEN";

/// Read-only client for the GitLab v4 REST API.
///
/// Tokens are passed per call; the client never stores one. The only state
/// shared between calls is the namespace to project ID cache.
pub struct GitLabClient {
    pub(super) client: Client,
    pub host: Url,
    pub(super) project_ids: ProjectIdCache,
}

impl GitLabClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jobtime/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JobTimeError::Config(format!("Failed to create HTTP client: {e}")))?;

        let host = Url::parse(base_url)
            .map_err(|e| JobTimeError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            host,
            project_ids: ProjectIdCache::default(),
        })
    }

    /// Issues one authenticated `GET` and returns the parsed JSON body.
    ///
    /// `path` is resolved against `host` when given, otherwise against the
    /// client's own host. Anything but HTTP 200 is a transport error; nothing
    /// is retried.
    pub async fn get_json(&self, path: &str, token: &Token, host: Option<&Url>) -> Result<Value> {
        let url = endpoint(host.unwrap_or(&self.host), path)?;
        fetch_json(self.client.clone(), url, token.clone()).await
    }
}

/// Joins an API path onto a host, keeping any sub-path the host is mounted at.
pub(super) fn endpoint(host: &Url, path: &str) -> Result<Url> {
    let mut base = host.clone();
    if !base.path().ends_with('/') {
        let mounted = format!("{}/", base.path());
        base.set_path(&mounted);
    }

    base.join(path.trim_start_matches('/'))
        .map_err(|e| JobTimeError::Config(format!("Invalid API URL for '{path}': {e}")))
}

/// Owns everything it needs so it can be boxed into a shared future.
pub(super) async fn fetch_json(client: Client, url: Url, token: Token) -> Result<Value> {
    debug!("GET {url}");

    let response = client
        .get(url)
        .header(PRIVATE_TOKEN_HEADER, token.as_str())
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(JobTimeError::Transport {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}
