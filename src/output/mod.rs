mod progress;
mod styling;
mod tables;

use comfy_table::Cell;
use serde::Serialize;

use crate::providers::Outcome;

pub use progress::ResolveProgress;
use styling::{dim, magenta_bold};
use tables::{color_coded_outcome_cell, create_table, optional_cell};

/// One resolved row of the pipeline page.
#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub stage: Option<String>,
    pub job: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub label: String,
}

impl JobRow {
    pub fn new(stage: Option<String>, job: Option<String>, outcome: Outcome) -> Self {
        let label = outcome.to_string();
        Self {
            stage,
            job,
            outcome,
            label,
        }
    }
}

/// Prints the jobtime banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⏱ jobtime"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Last run of every CI job")
    );
}

/// Renders resolved rows as a table.
pub fn render_table(rows: &[JobRow]) -> String {
    let mut table = create_table();
    table.set_header(vec![
        Cell::new("Stage"),
        Cell::new("Job"),
        Cell::new("Last run"),
    ]);

    for row in rows {
        table.add_row(vec![
            optional_cell(row.stage.as_deref()),
            optional_cell(row.job.as_deref()),
            color_coded_outcome_cell(&row.outcome),
        ]);
    }

    table.to_string()
}

pub fn render_json(rows: &[JobRow], pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(rows)
    } else {
        serde_json::to_string(rows)
    }
}
