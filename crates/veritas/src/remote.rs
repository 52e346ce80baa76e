// ABOUTME: HTTP client for the remote scoring service used in remote mode.
// ABOUTME: POSTs extracted article JSON and surfaces non-2xx responses with status and body.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AnalyzeError;
use crate::extract::Extraction;

/// Request body sent to the scoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRequest<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub text: &'a str,
    pub published_at: Option<&'a str>,
}

impl<'a> From<&'a Extraction> for RemoteRequest<'a> {
    fn from(extraction: &'a Extraction) -> Self {
        Self {
            url: &extraction.url,
            title: &extraction.title,
            text: &extraction.content.text,
            published_at: extraction.metadata.published_at.as_deref(),
        }
    }
}

/// Fields of the scoring service's response that presentation consumes.
/// Every field is optional; anything missing renders with a default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteAnalysis {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub claims_detected: Option<usize>,
    #[serde(default, deserialize_with = "lenient_claims")]
    pub claims: Vec<String>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub evidence_presence: Option<f64>,
    #[serde(default)]
    pub language_certainty: Option<f64>,
    #[serde(default)]
    pub source_reputation: Option<f64>,
}

/// Accept a non-negative whole number, as a JSON number or a numeric string.
/// Anything else reads as missing.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .and_then(|n| usize::try_from(n).ok()))
}

/// Accept a list of strings, or of objects with a `claim` string; anything
/// that is not a list becomes an empty list.
fn lenient_claims<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(map) => map.get("claim").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect())
}

/// Client for the remote scoring endpoint.
#[derive(Debug, Clone)]
pub struct RemoteScorer {
    client: reqwest::Client,
    endpoint: String,
    headers: HashMap<String, String>,
}

impl RemoteScorer {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            headers: HashMap::new(),
        }
    }

    /// Extra headers sent with every scoring request.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the extraction for scoring and wait for the structured response.
    ///
    /// There is no retry; a failed call is returned to the caller as-is.
    pub async fn score(&self, extraction: &Extraction) -> Result<RemoteAnalysis, AnalyzeError> {
        let body = RemoteRequest::from(extraction);

        let mut request = self.client.post(&self.endpoint).json(&body);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        debug!(endpoint = %self.endpoint, chars = body.text.len(), "calling scoring service");

        let response = request.send().await.map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "scoring service unreachable");
            AnalyzeError::transport(
                &self.endpoint,
                "Score",
                Some(anyhow::anyhow!("request failed: {}", e)),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                body = %text,
                "scoring service returned an error"
            );
            return Err(AnalyzeError::status(
                &self.endpoint,
                "Score",
                status.as_u16(),
                text,
            ));
        }

        response.json::<RemoteAnalysis>().await.map_err(|e| {
            AnalyzeError::decode(
                &self.endpoint,
                "Score",
                Some(anyhow::anyhow!("invalid response body: {}", e)),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::locator::RegionKind;
    use crate::extract::metadata::PublicationMetadata;
    use crate::extract::ExtractedContent;
    use httpmock::prelude::*;
    use serde_json::json;

    fn extraction(published_at: Option<&str>) -> Extraction {
        Extraction {
            url: "https://news.example.com/a".to_string(),
            title: "A headline".to_string(),
            region: RegionKind::Semantic,
            content: ExtractedContent::from_text("Para one.\n\nPara two.".to_string()),
            metadata: PublicationMetadata {
                published_at: published_at.map(str::to_string),
            },
        }
    }

    #[test]
    fn request_serializes_null_published_at() {
        let ex = extraction(None);
        assert_eq!(
            serde_json::to_value(RemoteRequest::from(&ex)).unwrap(),
            json!({
                "url": "https://news.example.com/a",
                "title": "A headline",
                "text": "Para one.\n\nPara two.",
                "published_at": null
            })
        );
    }

    #[test]
    fn claims_accept_strings_and_objects() {
        let parsed: RemoteAnalysis = serde_json::from_value(json!({
            "claims": ["plain", { "claim": "from object", "label": "unclear" }, 3]
        }))
        .unwrap();
        assert_eq!(parsed.claims, vec!["plain", "from object"]);

        let not_a_list: RemoteAnalysis = serde_json::from_value(json!({ "claims": "x" })).unwrap();
        assert!(not_a_list.claims.is_empty());
    }

    #[tokio::test]
    async fn score_posts_payload_and_parses_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/extract")
                .header("content-type", "application/json")
                .json_body(json!({
                    "url": "https://news.example.com/a",
                    "title": "A headline",
                    "text": "Para one.\n\nPara two.",
                    "published_at": "2024-02-03"
                }));
            then.status(200).json_body(json!({
                "source": "news.example.com",
                "publication_date": "2024-02-03",
                "claims_detected": 1,
                "claims": ["The sky is blue."],
                "verdict": "High",
                "summary": "Looks fine.",
                "evidence_presence": 0.8
            }));
        });

        let scorer = RemoteScorer::new(reqwest::Client::new(), server.url("/extract"));
        let analysis = scorer
            .score(&extraction(Some("2024-02-03")))
            .await
            .expect("score should succeed");
        mock.assert();

        assert_eq!(analysis.verdict.as_deref(), Some("High"));
        assert_eq!(analysis.claims, vec!["The sky is blue."]);
        assert_eq!(analysis.evidence_presence, Some(0.8));
        assert_eq!(analysis.language_certainty, None);
    }

    #[tokio::test]
    async fn non_2xx_carries_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/extract");
            then.status(422).body("text too short");
        });

        let scorer = RemoteScorer::new(reqwest::Client::new(), server.url("/extract"));
        let err = scorer
            .score(&extraction(None))
            .await
            .expect_err("422 should fail");
        assert!(err.is_status());
        assert_eq!(err.status, Some(422));
        assert_eq!(err.body.as_deref(), Some("text too short"));
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/extract");
            then.status(200).body("<html>oops</html>");
        });

        let scorer = RemoteScorer::new(reqwest::Client::new(), server.url("/extract"));
        let err = scorer.score(&extraction(None)).await.expect_err("should fail");
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        // listener dropped: the port refuses connections
        let scorer = RemoteScorer::new(reqwest::Client::new(), format!("http://{}/extract", addr));
        let err = scorer.score(&extraction(None)).await.expect_err("should fail");
        assert!(err.is_transport(), "got: {}", err);
    }

    #[test]
    fn claims_detected_accepts_loose_numbers() {
        let cases = [
            (json!({ "claims_detected": 4 }), Some(4)),
            (json!({ "claims_detected": 2.0 }), Some(2)),
            (json!({ "claims_detected": "3" }), Some(3)),
            (json!({ "claims_detected": -1 }), None),
            (json!({ "claims_detected": 1.5 }), None),
            (json!({ "claims_detected": null }), None),
            (json!({ "claims_detected": [1] }), None),
        ];
        for (body, expected) in cases {
            let parsed: RemoteAnalysis = serde_json::from_value(body.clone()).unwrap();
            assert_eq!(parsed.claims_detected, expected, "body: {}", body);
        }
    }
}
