//! Candidate validation: probe each candidate URL in priority order and stop
//! at the first confirmed feed.
//!
//! A candidate is confirmed when the response is 2xx and either the body's
//! root element identifies a feed (`<rss>`, `<rdf:RDF>`, `<feed>`) or the
//! Content-Type explicitly declares one. Per-candidate failures — transport
//! errors, timeouts, redirect loops, non-feed content — are absorbed and
//! logged; they never abort discovery for the entry.

use crate::limiter::RateLimiter;
use crate::types::{Candidate, FeedResult, FeedType};
use futures::StreamExt;
use quick_xml::events::Event;
use std::time::Duration;
use thiserror::Error;

/// Probe response bodies are capped at 5 MB; a feed root element appears in
/// the first bytes, so anything larger is read only up to the cap check.
const MAX_PROBE_SIZE: usize = 5 * 1024 * 1024;

/// Ways a single candidate probe can fail.
///
/// None of these are fatal to the entry: the validator logs the failure and
/// moves to the next candidate.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Network-level error (DNS, connection, TLS).
    #[error("network error: {0}")]
    Transport(reqwest::Error),
    /// The fetch exceeded the configured per-request timeout.
    #[error("request timed out")]
    Timeout,
    /// The redirect hop bound was exceeded.
    #[error("redirect limit exceeded")]
    RedirectLoop,
    /// Non-2xx final status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// Reachable, but neither the body root element nor the Content-Type
    /// identifies a feed.
    #[error("not a feed")]
    NotAFeed,
    /// Response body exceeded the size cap.
    #[error("response too large")]
    TooLarge,
}

fn classify_send_error(e: reqwest::Error) -> ProbeError {
    if e.is_redirect() {
        ProbeError::RedirectLoop
    } else if e.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Transport(e)
    }
}

/// Probes candidates in order and produces the entry's [`FeedResult`].
///
/// Consumes the sequence lazily: probing stops at the first success. An empty
/// candidate list is an error (it means nothing upstream produced anything to
/// try); exhausting a non-empty list without a hit is `NotFound`.
pub async fn validate_candidates(
    client: &reqwest::Client,
    limiter: &RateLimiter,
    request_timeout: Duration,
    blog_url: &str,
    candidates: Vec<Candidate>,
) -> FeedResult {
    if candidates.is_empty() {
        return FeedResult::error(blog_url, "no candidates to probe");
    }

    for candidate in candidates {
        match probe_candidate(client, limiter, request_timeout, &candidate).await {
            Ok((feed_url, feed_type)) => {
                tracing::info!(
                    blog = %blog_url,
                    feed = %feed_url,
                    feed_type = %feed_type,
                    source = %candidate.source,
                    "Feed confirmed"
                );
                return FeedResult::found(blog_url, feed_url, feed_type);
            }
            Err(e) => {
                tracing::debug!(
                    candidate = %candidate.url,
                    source = %candidate.source,
                    error = %e,
                    "Candidate rejected"
                );
            }
        }
    }

    FeedResult::not_found(blog_url)
}

/// Probes one candidate. On success returns the final post-redirect URL and
/// the detected feed type.
pub async fn probe_candidate(
    client: &reqwest::Client,
    limiter: &RateLimiter,
    request_timeout: Duration,
    candidate: &Candidate,
) -> Result<(String, FeedType), ProbeError> {
    limiter.acquire().await;

    let response = tokio::time::timeout(request_timeout, client.get(candidate.url.clone()).send())
        .await
        .map_err(|_| ProbeError::Timeout)?
        .map_err(classify_send_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::HttpStatus(status.as_u16()));
    }

    // Redirects were followed by the client; this is where the feed lives.
    let final_url = response.url().to_string();

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    let declares_feed = content_type.contains("application/rss+xml")
        || content_type.contains("application/atom+xml");

    let bytes = read_capped_bytes(response).await?;

    match sniff_feed_type(&bytes) {
        Some(feed_type) => Ok((final_url, feed_type)),
        // Well-formed XML with an unrecognized root: trust an explicit feed
        // Content-Type, reject otherwise.
        None if declares_feed => Ok((final_url, FeedType::Unknown)),
        None => Err(ProbeError::NotAFeed),
    }
}

/// Fetches a page body as text (used for the homepage fetch that feeds the
/// candidate generator). Same limits as candidate probes.
pub async fn fetch_page(
    client: &reqwest::Client,
    limiter: &RateLimiter,
    request_timeout: Duration,
    url: &url::Url,
) -> Result<String, ProbeError> {
    limiter.acquire().await;

    let response = tokio::time::timeout(request_timeout, client.get(url.clone()).send())
        .await
        .map_err(|_| ProbeError::Timeout)?
        .map_err(classify_send_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::HttpStatus(status.as_u16()));
    }

    let bytes = read_capped_bytes(response).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads a response body with the size cap, using stream-based reading.
async fn read_capped_bytes(response: reqwest::Response) -> Result<Vec<u8>, ProbeError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > MAX_PROBE_SIZE {
            return Err(ProbeError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ProbeError::Transport)?;
        if bytes.len().saturating_add(chunk.len()) > MAX_PROBE_SIZE {
            return Err(ProbeError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Identifies a feed by its root element without parsing the full body.
///
/// `<rss>` and `<rdf:RDF>` (RSS 1.0) classify as RSS, `<feed>` as Atom.
/// Returns `None` for any other root and for content that is not XML at all.
pub fn sniff_feed_type(bytes: &[u8]) -> Option<FeedType> {
    let mut reader = quick_xml::Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return match e.local_name().as_ref() {
                    b"rss" | b"RDF" => Some(FeedType::Rss),
                    b"feed" => Some(FeedType::Atom),
                    _ => None,
                };
            }
            Ok(Event::Eof) | Err(_) => return None,
            // Declarations, comments, PIs, whitespace before the root
            Ok(_) => {}
        }
        buf.clear();
    }
}
