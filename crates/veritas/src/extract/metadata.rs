// ABOUTME: Publication timestamp harvesting from meta annotations and time elements.
// ABOUTME: Walks a fixed priority list of sources and returns the first non-empty raw value.

//! Publication metadata harvesting.
//!
//! Key behaviors:
//! - Sources are tried in a fixed order; the first non-empty value wins.
//! - Values are trimmed but otherwise passed through untouched. No date
//!   parsing happens here.
//! - Missing metadata is a normal outcome, not an error.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::dom::{select_all, Capability};

/// A location a publication timestamp may be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    ArticlePublishedTime,
    OgPublishedTime,
    ItempropDatePublished,
    Pubdate,
    PublishDate,
    Date,
    TimeDatetime,
}

impl DateSource {
    /// All sources, highest priority first.
    pub const PRIORITY: [DateSource; 7] = [
        DateSource::ArticlePublishedTime,
        DateSource::OgPublishedTime,
        DateSource::ItempropDatePublished,
        DateSource::Pubdate,
        DateSource::PublishDate,
        DateSource::Date,
        DateSource::TimeDatetime,
    ];

    /// CSS selector for meta-tag sources; `None` for the `<time>` source.
    fn meta_selector(&self) -> Option<&'static str> {
        match self {
            DateSource::ArticlePublishedTime => Some(r#"meta[property="article:published_time"]"#),
            DateSource::OgPublishedTime => Some(r#"meta[property="og:published_time"]"#),
            DateSource::ItempropDatePublished => Some(r#"meta[itemprop="datePublished"]"#),
            DateSource::Pubdate => Some(r#"meta[name="pubdate"]"#),
            DateSource::PublishDate => Some(r#"meta[name="publish-date"]"#),
            DateSource::Date => Some(r#"meta[name="date"]"#),
            DateSource::TimeDatetime => None,
        }
    }

    /// Read this source from the document.
    pub fn read(&self, doc: &Html) -> Option<String> {
        match self.meta_selector() {
            Some(selector) => extract_meta_content(doc, selector),
            None => select_all(doc, Capability::TimeMarked)
                .into_iter()
                .next()
                .and_then(|el| el.value().attr("datetime"))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }
}

/// Publication metadata for a page. `published_at` is `None` when no source matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationMetadata {
    pub published_at: Option<String>,
}

/// The `content` attribute of the first tag matching `selector`, if non-empty.
///
/// Later tags for the same source are not consulted; an empty first tag hands
/// over to the next source.
fn extract_meta_content(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The first source yielding a value, together with that value.
pub fn harvest_with_source(doc: &Html) -> Option<(DateSource, String)> {
    DateSource::PRIORITY
        .iter()
        .find_map(|source| source.read(doc).map(|value| (*source, value)))
}

/// Harvest the best-guess publication timestamp.
pub fn harvest(doc: &Html) -> PublicationMetadata {
    PublicationMetadata {
        published_at: harvest_with_source(doc).map(|(_, value)| value),
    }
}
