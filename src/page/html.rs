use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

use super::DomNode;

/// A parsed pipeline page.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(source: &str) -> Self {
        Self {
            document: Html::parse_document(source),
        }
    }

    pub fn root(&self) -> HtmlNode<'_> {
        HtmlNode(self.document.tree.root())
    }
}

/// Any node of a parsed page, text nodes included.
#[derive(Clone, Copy)]
pub struct HtmlNode<'a>(NodeRef<'a, Node>);

impl<'a> DomNode for HtmlNode<'a> {
    fn parent(&self) -> Option<Self> {
        self.0.parent().map(HtmlNode)
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.0.prev_sibling().map(HtmlNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children().map(HtmlNode).collect()
    }

    fn tag_name(&self) -> Option<&str> {
        self.0.value().as_element().map(|element| element.name())
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.0
            .value()
            .as_element()
            .and_then(|element| element.attr(name))
    }

    fn text(&self) -> String {
        match self.0.value() {
            Node::Text(text) => (&**text).to_owned(),
            _ => ElementRef::wrap(self.0)
                .map(|element| element.text().collect())
                .unwrap_or_default(),
        }
    }
}
