// ABOUTME: Page-level extraction: snapshot capture, region location, text normalization and metadata.
// ABOUTME: Produces an owned Extraction so no DOM handle outlives the synchronous extraction step.

pub mod locator;
pub mod metadata;
pub mod normalize;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::locator::{locate, Region, RegionKind};
use crate::extract::metadata::{harvest, PublicationMetadata};
use crate::extract::normalize::{normalize, PARAGRAPH_SEPARATOR};

/// A page captured for one analysis run.
#[derive(Debug, Clone)]
pub struct PageSnapshot<'a> {
    pub url: String,
    pub title: String,
    pub region: Region<'a>,
}

impl<'a> PageSnapshot<'a> {
    /// Capture the page's title and article region.
    pub fn capture(doc: &'a Html, url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: document_title(doc),
            region: locate(doc),
        }
    }
}

/// Normalized article text and its shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub text: String,
    pub paragraph_count: usize,
    pub char_count: usize,
}

impl ExtractedContent {
    pub fn from_text(text: String) -> Self {
        let paragraph_count = if text.is_empty() {
            0
        } else {
            text.matches(PARAGRAPH_SEPARATOR).count() + 1
        };
        let char_count = text.chars().count();
        Self {
            text,
            paragraph_count,
            char_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// First `max_chars` characters of the text, for diagnostics.
    pub fn preview(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}

/// Everything the page-level step hands to the coordinator. Owns its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub url: String,
    pub title: String,
    pub region: RegionKind,
    pub content: ExtractedContent,
    pub metadata: PublicationMetadata,
}

/// `document.title`: the first `<title>` element's text, whitespace-collapsed.
pub fn document_title(doc: &Html) -> String {
    doc.root_element()
        .descendants()
        .filter_map(scraper::ElementRef::wrap)
        .find(|el| el.value().name() == "title")
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Run the synchronous extraction over raw HTML.
///
/// Region location and text normalization run in sequence; the publication
/// metadata is harvested from the whole document independently of both.
pub fn extract_page(html: &str, url: &str) -> Extraction {
    let doc = Html::parse_document(html);
    let snapshot = PageSnapshot::capture(&doc, url);
    let content = ExtractedContent::from_text(normalize(&snapshot.region));
    let metadata = harvest(&doc);

    debug!(
        url,
        region = ?snapshot.region.kind,
        paragraphs = content.paragraph_count,
        chars = content.char_count,
        published_at = metadata.published_at.as_deref().unwrap_or(""),
        "extracted page"
    );

    Extraction {
        url: snapshot.url,
        title: snapshot.title,
        region: snapshot.region.kind,
        content,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_counts_paragraphs_and_chars() {
        let content = ExtractedContent::from_text("Héllo.\n\nWorld.".to_string());
        assert_eq!(content.paragraph_count, 2);
        assert_eq!(content.char_count, 14);
        assert_eq!(ExtractedContent::from_text(String::new()).paragraph_count, 0);
    }

    #[test]
    fn extract_page_collects_title_text_and_date() {
        let html = r#"<!DOCTYPE html>
<html>
<head>
  <title>  City   council votes </title>
  <meta name="date" content="2024-06-01">
</head>
<body>
  <nav><a href="/">Home</a></nav>
  <main>
    <p>The council voted 7 to 2 on Tuesday.</p>
    <p>The budget takes effect in July.</p>
  </main>
</body>
</html>"#;
        let extraction = extract_page(html, "https://news.example.com/council");
        assert_eq!(extraction.region, RegionKind::Generic);
        assert_eq!(extraction.title, "City council votes");
        assert_eq!(
            extraction.content.text,
            "The council voted 7 to 2 on Tuesday.\n\nThe budget takes effect in July."
        );
        assert_eq!(extraction.metadata.published_at.as_deref(), Some("2024-06-01"));
    }

    #[test]
    fn extract_page_on_empty_document() {
        let extraction = extract_page("", "https://example.com/");
        assert_eq!(extraction.region, RegionKind::Body);
        assert_eq!(extraction.content.text, "");
        assert_eq!(extraction.title, "");
        assert_eq!(extraction.metadata.published_at, None);
    }
}
