// ABOUTME: Page capture over HTTP for analyzing a URL instead of pre-rendered HTML.
// ABOUTME: Enforces a body size limit and decodes bodies using the declared or detected charset.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use crate::error::AnalyzeError;

/// Maximum accepted page size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// A fetched page, body still undecoded.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedPage {
    /// Decode the body to a String using the content-type charset or detection.
    pub fn html(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Decode body bytes using the charset from the content-type header, falling
/// back to chardetng detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Charset value from a Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("charset=").map(str::to_string))
        .map(|cs| cs.trim_matches('"').trim_matches('\'').to_string())
}

/// Fetch a page for analysis. Only http(s) URLs answering 2xx are accepted.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    headers: &HashMap<String, String>,
) -> Result<FetchedPage, AnalyzeError> {
    if url.is_empty() {
        return Err(AnalyzeError::invalid_url(url, "Fetch", None));
    }

    let parsed = url::Url::parse(url).map_err(|e| {
        AnalyzeError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AnalyzeError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    let mut request = client.get(url);
    for (key, value) in headers {
        request = request.header(key, value);
    }

    let response = request.send().await.map_err(|e| {
        AnalyzeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
    })?;

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(AnalyzeError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    if !response.status().is_success() {
        return Err(AnalyzeError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    let body = response.bytes().await.map_err(|e| {
        AnalyzeError::fetch(url, "Fetch", Some(anyhow::anyhow!("failed to read body: {}", e)))
    })?;
    if body.len() > MAX_CONTENT_LENGTH {
        return Err(AnalyzeError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    debug!(url, final_url = %final_url, status, bytes = body.len(), "fetched page");

    Ok(FetchedPage {
        status,
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/story");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>héllo</p>");
        });

        let page = fetch_page(&reqwest::Client::new(), &server.url("/story"), &HashMap::new())
            .await
            .expect("fetch should succeed");
        mock.assert();
        assert_eq!(page.status, 200);
        assert_eq!(page.html(), "<p>héllo</p>");
    }

    #[tokio::test]
    async fn fetch_rejects_non_2xx() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("nope");
        });

        let err = fetch_page(&reqwest::Client::new(), &server.url("/missing"), &HashMap::new())
            .await
            .expect_err("404 should fail");
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn fetch_sends_custom_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/h").header("x-probe", "1");
            then.status(200).body("ok");
        });

        let mut headers = HashMap::new();
        headers.insert("x-probe".to_string(), "1".to_string());
        fetch_page(&reqwest::Client::new(), &server.url("/h"), &headers)
            .await
            .expect("fetch should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn fetch_rejects_bad_scheme() {
        let err = fetch_page(&reqwest::Client::new(), "ftp://example.com/x", &HashMap::new())
            .await
            .expect_err("ftp should fail");
        assert!(err.is_invalid_url());
    }

    #[test]
    fn charset_is_parsed_from_content_type() {
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn decodes_latin1_with_declared_charset() {
        let body = [0x63, 0x61, 0x66, 0xE9]; // "café" in ISO-8859-1
        assert_eq!(decode_body(&body, Some("text/html; charset=iso-8859-1")), "café");
    }
}
