// ABOUTME: Article gate deciding whether extracted text is worth scoring.
// ABOUTME: Local scoring requires a minimum word count; remote scoring only needs non-empty text.

use serde::{Deserialize, Serialize};

use crate::dom::word_count;
use crate::extract::ExtractedContent;

/// Minimum words required before the local scorer runs.
pub const DEFAULT_MIN_WORDS: usize = 200;

/// Pass condition for the article gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// At least this many words.
    MinWords(usize),
    /// Any non-empty text; the remote service does the deeper filtering.
    NonEmpty,
}

impl Default for GateMode {
    fn default() -> Self {
        GateMode::MinWords(DEFAULT_MIN_WORDS)
    }
}

impl GateMode {
    /// Returns true if the content may proceed to scoring.
    ///
    /// A failing gate is not an error; callers end the run quietly.
    pub fn admits(&self, content: &ExtractedContent) -> bool {
        match *self {
            GateMode::MinWords(min) => word_count(&content.text) >= min,
            GateMode::NonEmpty => !content.is_empty(),
        }
    }
}
