// ABOUTME: Capability matchers that classify elements as article-like, content-like or paragraph-like.
// ABOUTME: Pure predicates over scraper elements so the rules are testable without a rendering engine.

use scraper::{ElementRef, Html};

/// Class tokens that mark a generic content container.
const GENERIC_CONTENT_CLASSES: &[&str] = &["content", "post", "article"];

/// A structural capability an element may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `<article>`, or any element whose `itemtype` mentions "Article" (any case).
    SemanticArticle,
    /// `<main>`, `#main`, `.content`, `.post` or `.article`.
    GenericContent,
    /// `<p>`.
    Paragraph,
    /// `<time>` carrying a `datetime` attribute.
    TimeMarked,
}

impl Capability {
    /// Returns true if the element has this capability.
    pub fn matches(&self, el: &ElementRef<'_>) -> bool {
        let value = el.value();
        let tag = value.name();
        match self {
            Capability::SemanticArticle => {
                tag.eq_ignore_ascii_case("article")
                    || value
                        .attr("itemtype")
                        .map_or(false, |t| t.to_ascii_lowercase().contains("article"))
            }
            Capability::GenericContent => {
                tag.eq_ignore_ascii_case("main")
                    || value.id() == Some("main")
                    || value
                        .classes()
                        .any(|c| GENERIC_CONTENT_CLASSES.contains(&c))
            }
            Capability::Paragraph => tag.eq_ignore_ascii_case("p"),
            Capability::TimeMarked => {
                tag.eq_ignore_ascii_case("time") && value.attr("datetime").is_some()
            }
        }
    }
}

/// All elements in the document with the capability, in document order.
pub fn select_all<'a>(doc: &'a Html, cap: Capability) -> Vec<ElementRef<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| cap.matches(el))
        .collect()
}

/// Descendants of `root` (excluding `root` itself) with the capability, in document order.
pub fn select_within<'a>(root: ElementRef<'a>, cap: Capability) -> Vec<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| cap.matches(el))
        .collect()
}
