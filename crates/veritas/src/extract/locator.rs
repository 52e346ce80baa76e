// ABOUTME: Content region selection for article bodies in arbitrary HTML documents.
// ABOUTME: Prefers semantic article containers, then the wordiest generic container, then body.

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{select_all, visible_text, word_count, Capability};

/// A semantic container must have more than this many words to be chosen.
pub const SEMANTIC_MIN_WORDS: usize = 150;

/// Which rule selected a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Semantic,
    Generic,
    Body,
    Empty,
}

/// The DOM region believed to hold the article body.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    pub kind: RegionKind,
    pub element: Option<ElementRef<'a>>,
}

impl<'a> Region<'a> {
    fn new(kind: RegionKind, element: ElementRef<'a>) -> Self {
        Self {
            kind,
            element: Some(element),
        }
    }

    /// A region with no backing element. Its text is always empty.
    pub fn empty() -> Self {
        Self {
            kind: RegionKind::Empty,
            element: None,
        }
    }

    /// Visible text of the whole region.
    pub fn text(&self) -> String {
        self.element.map(visible_text).unwrap_or_default()
    }
}

/// The document's `<body>`, if the parser produced one.
pub fn body(doc: &Html) -> Option<ElementRef<'_>> {
    doc.root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
}

/// Select the region most likely to contain the article body.
///
/// Only the first semantic container in document order is considered; it wins
/// when it has more than [`SEMANTIC_MIN_WORDS`] words. Otherwise the generic
/// container with the most words wins (ties keep document order), unless its
/// text is empty. The body is the last resort, then an empty region.
pub fn locate(doc: &Html) -> Region<'_> {
    if let Some(semantic) = select_all(doc, Capability::SemanticArticle).into_iter().next() {
        let words = word_count(&visible_text(semantic));
        if words > SEMANTIC_MIN_WORDS {
            debug!(words, tag = semantic.value().name(), "selected semantic region");
            return Region::new(RegionKind::Semantic, semantic);
        }
        debug!(words, "semantic region too short, trying generic containers");
    }

    let mut candidates: Vec<(ElementRef<'_>, usize)> = select_all(doc, Capability::GenericContent)
        .into_iter()
        .map(|el| (el, word_count(&visible_text(el))))
        .collect();
    // sort_by is stable, so equal counts keep document order
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    if let Some(&(best, words)) = candidates.first() {
        if !visible_text(best).is_empty() {
            debug!(
                words,
                candidates = candidates.len(),
                tag = best.value().name(),
                "selected generic region"
            );
            return Region::new(RegionKind::Generic, best);
        }
    }

    match body(doc) {
        Some(el) => {
            debug!("falling back to body");
            Region::new(RegionKind::Body, el)
        }
        None => Region::empty(),
    }
}
