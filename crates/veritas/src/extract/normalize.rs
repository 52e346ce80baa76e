// ABOUTME: Converts a located DOM region into plain, paragraph-separated text.
// ABOUTME: Joins trimmed paragraph texts with blank lines, falling back to the region's visible text.

use scraper::ElementRef;

use crate::dom::{select_within, visible_text, Capability};
use crate::extract::locator::Region;

/// Separator placed between paragraphs in normalized text.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Trimmed, non-empty paragraph texts under `root`, in document order.
pub fn paragraphs(root: ElementRef<'_>) -> Vec<String> {
    select_within(root, Capability::Paragraph)
        .into_iter()
        .map(|p| visible_text(p).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Normalize a region into analyzable text.
///
/// Never fails: an empty region yields an empty string.
pub fn normalize(region: &Region<'_>) -> String {
    let Some(root) = region.element else {
        return String::new();
    };

    let paras = paragraphs(root);
    if paras.is_empty() {
        visible_text(root).trim().to_string()
    } else {
        paras.join(PARAGRAPH_SEPARATOR)
    }
}
