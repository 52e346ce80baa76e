// ABOUTME: Visible-text extraction and word counting over scraper elements.
// ABOUTME: Approximates innerText: skips hidden subtrees and breaks lines at block elements.

use ego_tree::iter::Edge;
use scraper::node::Element;
use scraper::{ElementRef, Node};

/// Subtrees that never contribute rendered text.
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

fn is_hidden(el: &Element) -> bool {
    if NON_RENDERED_TAGS.contains(&el.name()) || el.attr("hidden").is_some() {
        return true;
    }
    el.attr("style").map_or(false, |style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none")
    })
}

fn is_block(el: &Element) -> bool {
    BLOCK_TAGS.contains(&el.name())
}

/// Collapse whitespace within each line and drop blank lines.
fn collapse_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rendered text of an element, the way a browser's `innerText` would report it.
///
/// Text inside `script`/`style`/`noscript`/`template`/`head`, `hidden` elements
/// and inline `display:none` elements is skipped. Block elements and `<br>`
/// start new lines; whitespace inside a line collapses to a single space.
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    // Depth inside a hidden subtree; zero means text is rendered.
    let mut hidden_depth = 0usize;

    for edge in el.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(e) => {
                    if hidden_depth > 0 || is_hidden(e) {
                        hidden_depth += 1;
                    } else if is_block(e) {
                        raw.push('\n');
                    }
                }
                Node::Text(t) if hidden_depth == 0 => raw.push_str(t),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(e) = node.value() {
                    if hidden_depth > 0 {
                        hidden_depth -= 1;
                    } else if is_block(e) {
                        raw.push('\n');
                    }
                }
            }
        }
    }

    collapse_lines(&raw)
}

/// Number of whitespace-delimited tokens in `text`.
///
/// Empty or whitespace-only text counts as one word. Every caller (region
/// selection, the article gate and the scorer) shares this convention.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}
