// ABOUTME: Error types for the veritas pipeline including ErrorCode enum and AnalyzeError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the failure categories of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Extract,
    Transport,
    Status,
    Decode,
    Channel,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Extract => "extraction error",
            ErrorCode::Transport => "transport error",
            ErrorCode::Status => "unexpected status",
            ErrorCode::Decode => "decode error",
            ErrorCode::Channel => "coordinator unavailable",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for analysis operations.
///
/// `status` and `body` are only populated for [`ErrorCode::Status`], where the
/// remote scoring service answered with a non-2xx response.
#[derive(Debug, thiserror::Error)]
pub struct AnalyzeError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    pub status: Option<u16>,
    pub body: Option<String>,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "veritas: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(status) = self.status {
            write!(f, " {}", status)?;
        }
        if let Some(ref body) = self.body {
            if !body.is_empty() {
                write!(f, ": {}", body)?;
            }
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl AnalyzeError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            status: None,
            body: None,
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, url, op, source)
    }

    /// Create an Extract error (no page or document to analyze).
    pub fn extract(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Extract, url, op, source)
    }

    /// Create a Transport error (the remote call never produced a response).
    pub fn transport(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Transport, url, op, source)
    }

    /// Create a Status error carrying the non-2xx status code and response body.
    pub fn status(
        url: impl Into<String>,
        op: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        let mut err = Self::new(ErrorCode::Status, url, op, None);
        err.status = Some(status);
        err.body = Some(body.into());
        err
    }

    /// Create a Decode error (a response that is not the expected JSON shape).
    pub fn decode(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Decode, url, op, source)
    }

    /// Create a Channel error (the coordinator task is gone).
    pub fn channel(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Channel, "", op, source)
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is an Extract error.
    pub fn is_extract(&self) -> bool {
        self.code == ErrorCode::Extract
    }

    /// Returns true if this is a Transport error.
    pub fn is_transport(&self) -> bool {
        self.code == ErrorCode::Transport
    }

    /// Returns true if this is a Status error.
    pub fn is_status(&self) -> bool {
        self.code == ErrorCode::Status
    }

    /// Returns true if this is a Decode error.
    pub fn is_decode(&self) -> bool {
        self.code == ErrorCode::Decode
    }

    /// Returns true if this is a Channel error.
    pub fn is_channel(&self) -> bool {
        self.code == ErrorCode::Channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_includes_code_and_body() {
        let err = AnalyzeError::status("http://127.0.0.1:8000/extract", "Score", 422, "text too short");
        assert!(err.is_status());
        assert_eq!(err.status, Some(422));
        let msg = err.to_string();
        assert!(msg.contains("422"), "got: {}", msg);
        assert!(msg.contains("text too short"), "got: {}", msg);
    }

    #[test]
    fn channel_error_has_empty_url() {
        let err = AnalyzeError::channel("SendMessage", Some(anyhow::anyhow!("closed")));
        assert!(err.is_channel());
        assert!(err.url.is_empty());
        assert!(err.to_string().ends_with("closed"));
    }
}
