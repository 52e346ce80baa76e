// ABOUTME: Privileged coordinator task answering SCORE_ARTICLE messages over a request/response channel.
// ABOUTME: Messages are JSON values; unknown types get a structured failure instead of an error.

//! Cross-context coordinator.
//!
//! The page-level extractor never shares state with the coordinator. Each
//! request travels over an `mpsc` channel together with a `oneshot` reply
//! slot, so every request gets exactly one response.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::AnalyzeError;
use crate::present::BadgeSink;
use crate::scoring::{score_text, Label};

/// Message type asking the coordinator to score article text.
pub const SCORE_ARTICLE: &str = "SCORE_ARTICLE";

pub const UNKNOWN_MESSAGE_TYPE: &str = "Unknown message type.";

/// Payload of a `SCORE_ARTICLE` message. Missing or null fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ScorePayload {
    pub fn new(text: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            url: Some(url.into()),
            title: Some(title.into()),
        }
    }
}

/// Reply to a coordinator message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            score: None,
            label: None,
            explanation: None,
            error: Some(error.into()),
        }
    }
}

/// Answer one message. Never panics and never returns an error: every
/// failure becomes an `ok: false` response.
pub fn handle_message(message: &Value, badge: Option<&dyn BadgeSink>) -> Response {
    let kind = message.get("type").and_then(Value::as_str);
    if kind != Some(SCORE_ARTICLE) {
        warn!(message_type = kind.unwrap_or("<missing>"), "unknown message type");
        return Response::failure(UNKNOWN_MESSAGE_TYPE);
    }

    let payload: ScorePayload = match message.get("payload") {
        None | Some(Value::Null) => ScorePayload::default(),
        Some(raw) => match serde_json::from_value(raw.clone()) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "malformed SCORE_ARTICLE payload, scoring empty text");
                ScorePayload::default()
            }
        },
    };

    let verdict = score_text(payload.text.as_deref().unwrap_or(""));
    info!(
        url = payload.url.as_deref().unwrap_or(""),
        score = verdict.score,
        label = %verdict.label,
        "scored article"
    );

    if let Some(badge) = badge {
        badge.set_badge(&verdict.score.to_string());
    }

    Response {
        ok: true,
        score: Some(verdict.score),
        label: Some(verdict.label),
        explanation: Some(verdict.explanation),
        error: None,
    }
}

struct Envelope {
    message: Value,
    reply: oneshot::Sender<Response>,
}

/// Sending side of the coordinator. Cheap to clone.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Envelope>,
}

impl std::fmt::Debug for CoordinatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl CoordinatorHandle {
    /// Spawn the coordinator task on the current tokio runtime.
    ///
    /// The task ends once every handle has been dropped.
    pub fn spawn(badge: Option<Arc<dyn BadgeSink>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Envelope>(1);

        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let response = handle_message(&envelope.message, badge.as_deref());
                // the requester may have given up; nothing to do then
                let _ = envelope.reply.send(response);
            }
            debug!("coordinator stopped");
        });

        Self { tx }
    }

    /// Send a raw message and wait for its single response.
    pub async fn send_message(&self, message: Value) -> Result<Response, AnalyzeError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope { message, reply })
            .await
            .map_err(|e| AnalyzeError::channel("SendMessage", Some(anyhow::anyhow!("{}", e))))?;
        response
            .await
            .map_err(|e| AnalyzeError::channel("SendMessage", Some(anyhow::Error::new(e))))
    }

    /// Send a `SCORE_ARTICLE` request.
    pub async fn score_article(&self, payload: &ScorePayload) -> Result<Response, AnalyzeError> {
        self.send_message(json!({ "type": SCORE_ARTICLE, "payload": payload }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBadge(Mutex<Vec<String>>);

    impl BadgeSink for RecordingBadge {
        fn set_badge(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn unknown_type_is_structured_failure() {
        for message in [
            json!({ "type": "PING" }),
            json!({ "payload": { "text": "x" } }),
            json!("SCORE_ARTICLE"),
            json!(null),
        ] {
            let response = handle_message(&message, None);
            assert!(!response.ok);
            assert_eq!(response.error.as_deref(), Some(UNKNOWN_MESSAGE_TYPE));
            assert_eq!(response.score, None);
        }
    }

    #[test]
    fn unknown_type_serializes_without_verdict_fields() {
        let response = handle_message(&json!({ "type": "PING" }), None);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "ok": false, "error": "Unknown message type." })
        );
    }

    #[test]
    fn score_article_sets_badge() {
        let badge = RecordingBadge::default();
        let text = vec!["word"; 600].join(" ");
        let response = handle_message(
            &json!({ "type": SCORE_ARTICLE, "payload": { "text": text, "url": "https://a.test", "title": "A" } }),
            Some(&badge),
        );
        assert!(response.ok);
        assert_eq!(response.score, Some(85));
        assert_eq!(response.label, Some(Label::High));
        assert_eq!(*badge.0.lock().unwrap(), vec!["85".to_string()]);
    }

    #[test]
    fn missing_or_null_payload_scores_empty_text() {
        for message in [
            json!({ "type": SCORE_ARTICLE }),
            json!({ "type": SCORE_ARTICLE, "payload": null }),
            json!({ "type": SCORE_ARTICLE, "payload": { "text": null } }),
            json!({ "type": SCORE_ARTICLE, "payload": { "text": 42 } }),
        ] {
            let response = handle_message(&message, None);
            assert!(response.ok);
            assert_eq!(response.explanation.as_deref(), Some("Words: 1. Clickbait terms: 0."));
        }
    }

    #[tokio::test]
    async fn handle_round_trips_requests() {
        let handle = CoordinatorHandle::spawn(None);
        let text = format!("{} Breaking", vec!["word"; 599].join(" "));
        let response = handle
            .score_article(&ScorePayload::new(text, "https://a.test", "A"))
            .await
            .expect("coordinator should answer");
        assert_eq!(response.score, Some(70));
        assert_eq!(response.label, Some(Label::Medium));

        let unknown = handle
            .send_message(json!({ "type": "NOPE" }))
            .await
            .expect("coordinator should answer");
        assert!(!unknown.ok);
    }
}
