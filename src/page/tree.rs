//! In-memory node tree for exercising the extractors without an HTML parser.

use super::DomNode;

struct NodeData {
    tag: Option<String>,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    /// A tree holding a single `html` element.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                tag: Some("html".to_string()),
                attributes: Vec::new(),
                text: String::new(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root_id(&self) -> usize {
        0
    }

    pub fn root(&self) -> TreeNode<'_> {
        self.node(self.root_id())
    }

    pub fn node(&self, id: usize) -> TreeNode<'_> {
        TreeNode { tree: self, id }
    }

    pub fn element(&mut self, parent: usize, tag: &str, attributes: &[(&str, &str)]) -> usize {
        self.push(
            parent,
            NodeData {
                tag: Some(tag.to_string()),
                attributes: attributes
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
                text: String::new(),
                parent: Some(parent),
                children: Vec::new(),
            },
        )
    }

    pub fn text(&mut self, parent: usize, text: &str) -> usize {
        self.push(
            parent,
            NodeData {
                tag: None,
                attributes: Vec::new(),
                text: text.to_string(),
                parent: Some(parent),
                children: Vec::new(),
            },
        )
    }

    fn push(&mut self, parent: usize, data: NodeData) -> usize {
        let id = self.nodes.len();
        self.nodes.push(data);
        self.nodes[parent].children.push(id);
        id
    }
}

#[derive(Clone, Copy)]
pub struct TreeNode<'a> {
    tree: &'a Tree,
    id: usize,
}

impl<'a> TreeNode<'a> {
    pub fn id(&self) -> usize {
        self.id
    }

    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id]
    }
}

impl<'a> DomNode for TreeNode<'a> {
    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    fn previous_sibling(&self) -> Option<Self> {
        let parent = self.data().parent?;
        let siblings = &self.tree.nodes[parent].children;
        let position = siblings.iter().position(|&id| id == self.id)?;
        position
            .checked_sub(1)
            .map(|before| self.tree.node(siblings[before]))
    }

    fn children(&self) -> Vec<Self> {
        self.data()
            .children
            .iter()
            .map(|&id| self.tree.node(id))
            .collect()
    }

    fn tag_name(&self) -> Option<&str> {
        self.data().tag.as_deref()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.data()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn text(&self) -> String {
        let mut text = self.data().text.clone();
        for child in self.children() {
            text.push_str(&child.text());
        }
        text
    }
}

/// A synthetic pipeline page plus the duration anchors of its job rows.
pub struct PipelinePage {
    pub tree: Tree,
    /// Anchors for `compile` (stage `build`), `unit-tests` and `lint` (stage `test`)
    pub anchors: Vec<usize>,
}

/// Builds a pipeline page laid out the way GitLab renders its job table.
///
/// `commit_href` becomes the branch info link; `None` leaves it out.
pub fn pipeline_page(commit_href: Option<&str>) -> PipelinePage {
    let mut tree = Tree::new();
    let body = tree.element(tree.root_id(), "body", &[]);

    let info = tree.element(body, "div", &[("class", "info-well branch-info")]);
    if let Some(href) = commit_href {
        let link = tree.element(info, "a", &[("href", href), ("class", "commit-sha")]);
        tree.text(link, "abc123");
    }

    let table = tree.element(body, "table", &[("class", "table ci-table pipeline")]);
    let tbody = tree.element(table, "tbody", &[]);

    let mut anchors = Vec::new();
    for (stage, jobs) in [("build", vec!["compile"]), ("test", vec!["unit-tests", "lint"])] {
        let header = tree.element(tbody, "tr", &[]);
        let header_cell = tree.element(header, "th", &[]);
        let marker = tree.element(header_cell, "a", &[("name", stage)]);
        tree.text(marker, stage);
        tree.text(tbody, "\n  ");

        for job in jobs {
            let row = tree.element(tbody, "tr", &[("class", "build")]);
            let status_cell = tree.element(row, "td", &[]);
            tree.text(status_cell, "passed");
            let name_cell = tree.element(row, "td", &[]);
            tree.text(name_cell, &format!("\n    {job}\n  "));
            tree.text(row, "\n  ");
            tree.element(row, "span", &[("class", "spacer")]);
            let duration_cell = tree.element(row, "td", &[]);
            let anchor = tree.element(duration_cell, "p", &[("class", "duration")]);
            tree.text(anchor, "00:42");
            anchors.push(anchor);
        }
    }

    PipelinePage { tree, anchors }
}
