//! Visible-text extraction from arbitrary HTML pages.

use ego_tree::iter::Edge;
use scraper::{Html, Node};

/// Elements whose contents never reach the reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Concatenate every text node of `html` in document order.
///
/// Whitespace is kept as-is so that callers can concatenate pages without
/// losing the separators a page carries itself.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    // Depth of open hidden elements; text only counts at zero.
    let mut hidden = 0_usize;
    for edge in document.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(fragment) if hidden == 0 => text.push_str(fragment),
                Node::Element(element) if is_hidden(element.name()) => hidden += 1,
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(element) = node.value() {
                    if is_hidden(element.name()) {
                        hidden -= 1;
                    }
                }
            }
        }
    }
    text
}

fn is_hidden(name: &str) -> bool {
    HIDDEN_ELEMENTS.contains(&name)
}
