// ABOUTME: AnalysisReport view-model handed to presentation, built from local or remote verdicts.
// ABOUTME: Includes text rendering with Unknown/Pending defaults for missing fields.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::extract::Extraction;
use crate::remote::RemoteAnalysis;
use crate::scoring::Verdict;

pub const UNKNOWN: &str = "Unknown";
pub const PENDING: &str = "Pending";

/// Normalized sub-scores from the remote service, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub evidence_presence: Option<f64>,
    pub language_certainty: Option<f64>,
    pub source_reputation: Option<f64>,
}

impl SubScores {
    pub fn is_empty(&self) -> bool {
        self.evidence_presence.is_none()
            && self.language_certainty.is_none()
            && self.source_reputation.is_none()
    }
}

fn unit_interval(name: &str, value: Option<f64>) -> Option<f64> {
    let v = value?;
    if !v.is_finite() {
        warn!(field = name, "dropping non-finite sub-score");
        return None;
    }
    if !(0.0..=1.0).contains(&v) {
        warn!(field = name, value = v, "sub-score outside [0, 1], clamping");
    }
    Some(v.clamp(0.0, 1.0))
}

/// Source attribution from the page URL: its host, lower-cased, without `www.`.
pub fn source_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Everything presentation needs to show one finished analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub url: String,
    pub title: String,
    pub source: Option<String>,
    pub publication_date: Option<String>,
    pub claims_detected: usize,
    pub claims: Vec<String>,
    pub verdict: Option<String>,
    pub score: Option<u8>,
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "SubScores::is_empty")]
    pub sub_scores: SubScores,
}

impl AnalysisReport {
    /// Report for a locally scored page.
    pub fn from_local(extraction: &Extraction, verdict: &Verdict, claims: Vec<String>) -> Self {
        Self {
            url: extraction.url.clone(),
            title: extraction.title.clone(),
            source: source_from_url(&extraction.url),
            publication_date: extraction.metadata.published_at.clone(),
            claims_detected: claims.len(),
            claims,
            verdict: Some(verdict.label.to_string()),
            score: Some(verdict.score),
            summary: Some(verdict.explanation.clone()),
            sub_scores: SubScores::default(),
        }
    }

    /// Report for a page scored by the remote service.
    pub fn from_remote(extraction: &Extraction, remote: RemoteAnalysis) -> Self {
        let claims_detected = remote.claims_detected.unwrap_or(remote.claims.len());
        Self {
            url: extraction.url.clone(),
            title: extraction.title.clone(),
            source: remote.source,
            publication_date: remote.publication_date,
            claims_detected,
            claims: remote.claims,
            verdict: remote.verdict,
            score: None,
            summary: remote.summary,
            sub_scores: SubScores {
                evidence_presence: unit_interval("evidence_presence", remote.evidence_presence),
                language_certainty: unit_interval("language_certainty", remote.language_certainty),
                source_reputation: unit_interval("source_reputation", remote.source_reputation),
            },
        }
    }

    /// Badge text: the numeric score, when there is one.
    pub fn badge_text(&self) -> Option<String> {
        self.score.map(|s| s.to_string())
    }

    /// Render the report as plain text for a terminal.
    pub fn format_text(&self) -> String {
        let mut parts = Vec::new();

        if !self.title.is_empty() {
            parts.push(self.title.clone());
        }

        let verdict = self.verdict.as_deref().unwrap_or(PENDING);
        match self.score {
            Some(score) => parts.push(format!("Credibility: {} ({}%)", verdict, score)),
            None => parts.push(format!("Verdict: {}", verdict)),
        }

        parts.push(format!(
            "Source: {}",
            self.source.as_deref().unwrap_or(UNKNOWN)
        ));
        parts.push(format!(
            "Published: {}",
            self.publication_date.as_deref().unwrap_or(UNKNOWN)
        ));
        parts.push(format!("Claims detected: {}", self.claims_detected));

        if let Some(ref summary) = self.summary {
            if !summary.is_empty() {
                parts.push(format!("Why: {}", summary));
            }
        }

        let sub = [
            ("Evidence presence", self.sub_scores.evidence_presence),
            ("Language certainty", self.sub_scores.language_certainty),
            ("Source reputation", self.sub_scores.source_reputation),
        ];
        for (name, value) in sub {
            if let Some(v) = value {
                parts.push(format!("{}: {:.2}", name, v));
            }
        }

        if !self.claims.is_empty() {
            let list = self
                .claims
                .iter()
                .enumerate()
                .map(|(i, c)| format!("  {}. {}", i + 1, c))
                .collect::<Vec<_>>()
                .join("\n");
            parts.push(format!("Claims:\n{}", list));
        }

        parts.join("\n")
    }
}
