// ABOUTME: Heuristic claim detection over article text for local report enrichment.
// ABOUTME: Keeps declarative, fact-shaped sentences ranked by a simple salience score.

//! Claim detection.
//!
//! A sentence is a candidate claim when it has a reasonable length, is not a
//! question, and mentions either a number or a capitalized name. Candidates
//! are ranked by salience, deduplicated and capped.

use serde::{Deserialize, Serialize};

/// Knobs for claim detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimConfig {
    pub max_claims: usize,
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub require_entity_or_digit: bool,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            max_claims: 12,
            min_tokens: 8,
            max_tokens: 40,
            require_entity_or_digit: true,
        }
    }
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
fn sentences(text: &str) -> Vec<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = collapsed.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(space_at, ' ')) = chars.peek() {
                out.push(collapsed[start..space_at].trim().to_string());
                start = space_at + 1;
            }
        }
    }
    let tail = collapsed[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out.retain(|s| !s.is_empty());
    out
}

/// A capitalized token after the first word stands in for a named entity.
fn has_entity(sentence: &str) -> bool {
    sentence
        .split_whitespace()
        .skip(1)
        .any(|tok| tok.chars().next().map_or(false, char::is_uppercase))
}

fn has_numeric_fact(sentence: &str) -> bool {
    sentence.chars().any(|c| c.is_ascii_digit() || c == '%')
}

fn salience(sentence: &str, index: usize, cfg: &ClaimConfig) -> f64 {
    let tokens = sentence.split_whitespace().count();
    let mut score = 0.0;
    if (cfg.min_tokens..=cfg.max_tokens).contains(&tokens) {
        score += 0.4;
    }
    if has_entity(sentence) {
        score += 0.35;
    }
    if has_numeric_fact(sentence) {
        score += 0.15;
    }
    if index <= 5 {
        score += 0.1;
    }
    f64::clamp(score, 0.0, 1.0)
}

/// Lowercased alphanumeric key used to drop near-identical sentences.
fn dedupe_key(sentence: &str) -> String {
    sentence
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract up to `cfg.max_claims` claims, most salient first.
pub fn extract_claims(text: &str, cfg: &ClaimConfig) -> Vec<String> {
    let mut candidates: Vec<(f64, String)> = Vec::new();

    for (index, sentence) in sentences(text).into_iter().enumerate() {
        let tokens = sentence.split_whitespace().count();
        if tokens < cfg.min_tokens || tokens > cfg.max_tokens {
            continue;
        }
        if cfg.require_entity_or_digit && !(has_entity(&sentence) || has_numeric_fact(&sentence)) {
            continue;
        }
        if sentence.ends_with('?') {
            continue;
        }
        candidates.push((salience(&sentence, index, cfg), sentence));
    }

    // stable: equal salience keeps text order
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|(_, s)| seen.insert(dedupe_key(s)))
        .map(|(_, s)| s)
        .take(cfg.max_claims)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_sentences_on_terminal_punctuation() {
        assert_eq!(
            sentences("One two.  Three\nfour!  Five? six"),
            vec!["One two.", "Three four!", "Five?", "six"]
        );
        assert_eq!(sentences("Version 2.5 shipped."), vec!["Version 2.5 shipped."]);
    }

    #[test]
    fn keeps_fact_shaped_sentences_only() {
        let text = "the weather was nice and everyone had a lovely time outside. \
                    The city council approved a budget of 4 million dollars on Monday. \
                    Did the Mayor really sign the 2024 budget into law last week? \
                    Short one.";
        let claims = extract_claims(text, &ClaimConfig::default());
        assert_eq!(
            claims,
            vec!["The city council approved a budget of 4 million dollars on Monday."]
        );
    }

    #[test]
    fn ranks_by_salience_and_dedupes() {
        let text = "officials said the bridge would reopen sometime in 2025 at the earliest. \
                    Engineers from Acme inspected the bridge and found 12 cracked beams. \
                    Engineers from ACME inspected the bridge, and found 12 cracked beams!";
        let claims = extract_claims(text, &ClaimConfig::default());
        assert_eq!(claims.len(), 2);
        assert!(claims[0].starts_with("Engineers from Acme"));
        assert!(claims[1].starts_with("officials said"));
    }

    #[test]
    fn respects_cap() {
        let sentence = "Reporters counted 10 protesters outside the Capitol building today.";
        let text: Vec<String> = (0..20).map(|i| sentence.replace("10", &i.to_string())).collect();
        let cfg = ClaimConfig {
            max_claims: 3,
            ..ClaimConfig::default()
        };
        assert_eq!(extract_claims(&text.join(" "), &cfg).len(), 3);
    }
}
