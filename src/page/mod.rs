//! Reads job context out of a GitLab pipeline page.
//!
//! The job table carries no IDs, so everything here works by relative
//! position: a stage header row precedes the rows of its jobs, and the job
//! name cell comes before the duration cell.

mod html;
#[cfg(test)]
pub(crate) mod tree;

use log::debug;
use serde::Serialize;

pub use html::HtmlPage;

/// SHA of a commit as written in a page link.
pub type CommitRef = String;

/// The small slice of a DOM node the extractors rely on.
pub trait DomNode: Clone {
    fn parent(&self) -> Option<Self>;

    fn previous_sibling(&self) -> Option<Self>;

    fn children(&self) -> Vec<Self>;

    /// Lowercase element name, `None` for text and other non-element nodes.
    fn tag_name(&self) -> Option<&str>;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Concatenated text of this node and everything below it.
    fn text(&self) -> String;

    fn is_element(&self, tag: &str) -> bool {
        self.tag_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Nearest strict ancestor with the given tag.
    fn closest(&self, tag: &str) -> Option<Self> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_element(tag) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Every node below this one, in document order.
    fn descendants(&self) -> Vec<Self> {
        let mut found = Vec::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            found.push(node);
        }
        found
    }
}

/// Stage and job name of one row in the job table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobContext {
    pub stage: Option<String>,
    pub name: Option<String>,
}

/// Everything the resolver needs to know about one activated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub commit: Option<CommitRef>,
    pub job: JobContext,
}

/// Collects the commit, stage and job name for the row holding `anchor`.
pub fn extract_context<N: DomNode>(root: &N, anchor: &N) -> PageContext {
    PageContext {
        commit: find_current_commit(root),
        job: JobContext {
            stage: find_stage(anchor),
            name: find_job_name(anchor),
        },
    }
}

/// Finds the SHA of the commit the page is about.
///
/// Looks for a link to `/commit/<sha>` inside the branch info block.
pub fn find_current_commit<N: DomNode>(root: &N) -> Option<CommitRef> {
    let link = root
        .descendants()
        .into_iter()
        .filter(|node| node.has_class("branch-info"))
        .flat_map(|region| region.descendants())
        .find(|node| {
            node.is_element("a")
                && node
                    .attribute("href")
                    .is_some_and(|href| href.contains("/commit"))
        });

    let Some(link) = link else {
        debug!("No link containing '/commit' in the branch info");
        return None;
    };

    let href = link.attribute("href").unwrap_or_default();
    let sha = commit_from_href(href);
    if sha.is_none() {
        debug!("Can't parse a commit SHA out of link {href}");
    }
    sha
}

fn commit_from_href(href: &str) -> Option<CommitRef> {
    href.match_indices("/commit/").find_map(|(at, marker)| {
        let sha: String = href[at + marker.len()..]
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();
        (!sha.is_empty()).then_some(sha)
    })
}

/// Finds the stage a job row belongs to.
///
/// Walks back from the anchor's row to the nearest earlier row that holds a
/// named stage marker (`<a name="...">`).
pub fn find_stage<N: DomNode>(anchor: &N) -> Option<String> {
    let Some(row) = anchor.closest("tr") else {
        debug!("Anchor is not inside a table row");
        return None;
    };

    let mut sibling = row.previous_sibling();
    while let Some(node) = sibling {
        if node.is_element("tr") {
            let marker = node
                .descendants()
                .into_iter()
                .find(|n| n.is_element("a") && n.attribute("name").is_some());
            if let Some(marker) = marker {
                return marker.attribute("name").map(ToOwned::to_owned);
            }
        }
        sibling = node.previous_sibling();
    }

    debug!("Reached the top of the table without finding a stage");
    None
}

/// Finds the name of the job whose duration cell holds `anchor`.
///
/// The name is the text of the closest cell before that one; text and other
/// non-cell siblings in between are skipped.
pub fn find_job_name<N: DomNode>(anchor: &N) -> Option<String> {
    let Some(cell) = anchor.closest("td") else {
        debug!("Anchor is not inside a table cell");
        return None;
    };

    let mut sibling = cell.previous_sibling();
    while let Some(node) = sibling {
        if node.is_element("td") {
            let name = node.text().trim().to_owned();
            return (!name.is_empty()).then_some(name);
        }
        sibling = node.previous_sibling();
    }

    debug!("No cell before the duration cell");
    None
}

/// Every job duration element of the pipeline table, in page order.
///
/// Each one anchors a job row. A page without a pipeline table has none.
pub fn find_duration_anchors<N: DomNode>(root: &N) -> Vec<N> {
    root.descendants()
        .into_iter()
        .filter(|node| node.is_element("table") && node.has_class("ci-table") && node.has_class("pipeline"))
        .flat_map(|table| table.descendants())
        .filter(|node| {
            node.is_element("p")
                && node.has_class("duration")
                && node.closest("td").is_some()
        })
        .collect()
}

/// Project namespace (`group/project`) from a page path like `/group/project/-/pipelines/1`.
pub fn project_from_path(path: &str) -> Option<String> {
    let mut segments = path.strip_prefix('/')?.splitn(3, '/');
    let group = segments.next()?;
    let project = segments.next()?;
    // the namespace must be followed by a slash
    segments.next()?;
    Some(format!("{group}/{project}"))
}
