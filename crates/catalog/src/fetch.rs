// ABOUTME: Single-attempt HTTP operations for listing, detail, and image probes.
// ABOUTME: Non-2xx is a fetch error; bodies are decoded per charset header or detection.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use crate::error::ScrapeError;

/// Result of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decodes the body to text using the Content-Type charset when present,
    /// falling back to encoding detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Fetches `url` with a single GET. One attempt, no retries; any network
/// error, timeout, or non-2xx status is a `ScrapeError::Fetch`.
pub async fn get(client: &reqwest::Client, url: &str) -> Result<FetchResult, ScrapeError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ScrapeError::fetch(url, e))?;
    into_result(url, response).await
}

/// POSTs a form-encoded payload with a single attempt.
pub async fn post_form(
    client: &reqwest::Client,
    url: &str,
    form: &HashMap<String, String>,
) -> Result<FetchResult, ScrapeError> {
    let response = client
        .post(url)
        .form(form)
        .send()
        .await
        .map_err(|e| ScrapeError::fetch(url, e))?;
    into_result(url, response).await
}

/// Probes a resource's byte length with a HEAD request. Best-effort: any
/// failure or missing header yields `None`, which callers turn into the
/// size sentinel.
pub async fn head_content_length(client: &reqwest::Client, url: &str) -> Option<u64> {
    let response = match client.head(url).send().await {
        Ok(r) => r,
        Err(err) => {
            debug!(%url, %err, "image size probe failed");
            return None;
        }
    };
    if !response.status().is_success() {
        debug!(%url, status = %response.status(), "image size probe returned non-2xx");
        return None;
    }
    response.content_length().or_else(|| {
        response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
    })
}

async fn into_result(url: &str, response: reqwest::Response) -> Result<FetchResult, ScrapeError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::fetch(url, format!("status {status}")));
    }
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let body = response
        .bytes()
        .await
        .map_err(|e| ScrapeError::fetch(url, e))?;
    Ok(FetchResult {
        status: status.as_u16(),
        final_url,
        content_type,
        body,
    })
}

/// Decodes raw bytes using the declared charset, else detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let (decoded, _, _) = detector.guess(None, true).decode(body);
    decoded.into_owned()
}

/// Pulls the charset parameter out of a Content-Type header value.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            part.strip_prefix("charset=")
                .map(|c| c.trim_matches(|q| q == '"' || q == '\'').to_string())
        })
}
