use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::Term;
use futures::future::join_all;
use log::{info, warn};
use std::path::{Path, PathBuf};
use url::Url;

use crate::auth::{TerminalTokenProvider, Token, TokenProvider};
use crate::config::Config;
use crate::error::JobTimeError;
use crate::output::{self, JobRow, ResolveProgress};
use crate::page::{extract_context, find_duration_anchors, project_from_path, HtmlPage, PageContext};
use crate::providers::{GitLabProvider, Resolution};

#[derive(Parser)]
#[command(name = "jobtime")]
#[command(author, version, about = "Shows how long each CI job took the last time it ran", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the last run of every job on a saved GitLab pipeline page
    Gitlab {
        /// Saved HTML of the pipeline page
        #[arg(long)]
        page: PathBuf,

        #[arg(short, long, env = "GITLAB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// GitLab instance base URL [default: https://gitlab.com]
        #[arg(short, long)]
        url: Option<String>,

        #[arg(short = 'P', long)]
        project: Option<String>,

        /// Address the page was saved from; supplies project and host when not given
        #[arg(long)]
        page_url: Option<String>,

        /// Only resolve rows for this job
        #[arg(short, long)]
        job: Option<String>,
    },
}

impl Cli {
    #[allow(clippy::too_many_arguments)]
    async fn execute_gitlab(
        &self,
        page_path: &Path,
        token: Option<&str>,
        url: Option<&str>,
        project: Option<&str>,
        page_url: Option<&str>,
        job: Option<&str>,
    ) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        let project = resolve_project(project, page_url, config.gitlab.project.as_deref())?;
        let base_url = resolve_base_url(url, page_url, &config.gitlab.base_url)?;
        info!("Resolving last job runs for project {project} on {base_url}");

        let source = std::fs::read_to_string(page_path)
            .with_context(|| format!("Failed to read page: {}", page_path.display()))?;
        let page = HtmlPage::parse(&source);
        let root = page.root();

        let contexts: Vec<PageContext> = find_duration_anchors(&root)
            .iter()
            .map(|anchor| extract_context(&root, anchor))
            .filter(|context| job.is_none() || context.job.name.as_deref() == job)
            .collect();

        if contexts.is_empty() {
            warn!("No job rows found in {}", page_path.display());
            return Ok(());
        }

        let token = token
            .map(ToOwned::to_owned)
            .or(config.gitlab.token)
            .map(Token::from);
        let tokens = TerminalTokenProvider::new(token, Term::stderr().is_term());
        let provider = GitLabProvider::new(&base_url, project)?;

        // a prompt would fight the spinner for the terminal
        let progress = tokens
            .token()
            .is_some()
            .then(|| ResolveProgress::start(contexts.len()));

        let resolutions = join_all(
            contexts
                .iter()
                .map(|context| provider.resolve(context, &tokens)),
        )
        .await;

        let Some(rows) = collect_rows(contexts, resolutions, progress)? else {
            info!("No GitLab token given, nothing to do");
            return Ok(());
        };

        let rendered = if self.json {
            output::render_json(&rows, self.pretty)?
        } else {
            output::render_table(&rows)
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, rendered)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Results written to: {}", output_path.display());
        } else {
            println!("{rendered}");
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Gitlab {
                page,
                token,
                url,
                project,
                page_url,
                job,
            } => {
                self.execute_gitlab(
                    page,
                    token.as_deref(),
                    url.as_deref(),
                    project.as_deref(),
                    page_url.as_deref(),
                    job.as_deref(),
                )
                .await
            }
        }
    }
}

/// Pairs each row with its resolution and closes the spinner.
///
/// `Ok(None)` means no token was given and there is nothing to show.
fn collect_rows(
    contexts: Vec<PageContext>,
    resolutions: Vec<Resolution>,
    progress: Option<ResolveProgress>,
) -> Result<Option<Vec<JobRow>>> {
    let mut rows = Vec::with_capacity(contexts.len());
    for (context, resolution) in contexts.into_iter().zip(resolutions) {
        let outcome = match resolution {
            Resolution::Resolved(outcome) => outcome,
            Resolution::NoCommit => {
                if let Some(progress) = progress {
                    progress.clear();
                }
                return Err(JobTimeError::NoCommit.into());
            }
            Resolution::NoToken => {
                if let Some(progress) = progress {
                    progress.clear();
                }
                return Ok(None);
            }
        };
        rows.push(JobRow::new(context.job.stage, context.job.name, outcome));
    }

    if let Some(progress) = progress {
        progress.finish(rows.len());
    }
    Ok(Some(rows))
}

/// Picks the project path: `--project`, then the page address, then the config file.
fn resolve_project(
    project: Option<&str>,
    page_url: Option<&str>,
    configured: Option<&str>,
) -> Result<String> {
    if let Some(project) = project {
        return Ok(project.to_owned());
    }

    if let Some(page_url) = page_url {
        let url = Url::parse(page_url).with_context(|| format!("Invalid page URL: {page_url}"))?;
        return project_from_path(url.path())
            .with_context(|| format!("Can't find a project path in {page_url}"));
    }

    configured.map(ToOwned::to_owned).context(
        "No project given: pass --project or --page-url, or set gitlab.project in the config file",
    )
}

/// Picks the host: `--url`, then the page address, then the config file.
fn resolve_base_url(url: Option<&str>, page_url: Option<&str>, configured: &str) -> Result<String> {
    if let Some(url) = url {
        return Ok(url.to_owned());
    }

    if let Some(page_url) = page_url {
        let url = Url::parse(page_url).with_context(|| format!("Invalid page URL: {page_url}"))?;
        return Ok(url.origin().ascii_serialization());
    }

    Ok(configured.to_owned())
}
