// ABOUTME: Heuristic credibility scoring: text signals to a bounded, labeled verdict.
// ABOUTME: Penalizes short articles and clickbait phrases from a fixed baseline of 85.

//! Credibility scoring.
//!
//! The score starts at [`BASELINE`], loses up to 30 points for articles under
//! [`FULL_LENGTH_WORDS`] words and [`CLICKBAIT_PENALTY`] points per clickbait
//! phrase occurrence, is rounded half-up and clamped to `[1, 99]`.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom::word_count;

pub const BASELINE: f64 = 85.0;
pub const FULL_LENGTH_WORDS: usize = 600;
pub const SHORT_PENALTY_DIVISOR: f64 = 20.0;
pub const CLICKBAIT_PENALTY: f64 = 15.0;
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 99;

static CLICKBAIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(shocking|you won'?t believe|click here|breaking)\b").unwrap()
});

/// Credibility band derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Low,
    Medium,
    High,
}

impl Label {
    /// High at 75 and above, Medium from 50, Low below.
    pub fn from_score(score: u8) -> Self {
        if score >= 75 {
            Label::High
        } else if score >= 50 {
            Label::Medium
        } else {
            Label::Low
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::High => "High",
            Label::Medium => "Medium",
            Label::Low => "Low",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Label::High),
            "medium" => Ok(Label::Medium),
            "low" => Ok(Label::Low),
            other => Err(format!("unknown label: {}", other)),
        }
    }
}

/// Signals read from article text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredibilitySignals {
    pub word_count: usize,
    pub clickbait_hit_count: usize,
}

impl CredibilitySignals {
    pub fn from_text(text: &str) -> Self {
        Self {
            word_count: word_count(text),
            clickbait_hit_count: clickbait_hits(text),
        }
    }
}

/// Number of clickbait phrase occurrences; repeats of one phrase all count.
pub fn clickbait_hits(text: &str) -> usize {
    CLICKBAIT_RE.find_iter(text).count()
}

/// The terminal artifact of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub score: u8,
    pub label: Label,
    pub explanation: String,
}

/// Unrounded, unclamped score.
pub fn raw_score(signals: &CredibilitySignals) -> f64 {
    let shortfall = FULL_LENGTH_WORDS.saturating_sub(signals.word_count) as f64;
    BASELINE
        - shortfall / SHORT_PENALTY_DIVISOR
        - signals.clickbait_hit_count as f64 * CLICKBAIT_PENALTY
}

/// Round half-up (`floor(x + 0.5)`) and clamp into `[MIN_SCORE, MAX_SCORE]`.
pub fn finalize_score(raw: f64) -> u8 {
    let rounded = (raw + 0.5).floor();
    rounded.clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8
}

/// Score the signals. Deterministic and side-effect free.
pub fn score(signals: &CredibilitySignals) -> Verdict {
    let score = finalize_score(raw_score(signals));
    Verdict {
        score,
        label: Label::from_score(score),
        explanation: format!(
            "Words: {}. Clickbait terms: {}.",
            signals.word_count, signals.clickbait_hit_count
        ),
    }
}

/// Convenience: signals and verdict straight from text.
pub fn score_text(text: &str) -> Verdict {
    score(&CredibilitySignals::from_text(text))
}
