use thiserror::Error;
use url::Url;

/// Errors produced when canonicalizing a raw input string into a URL.
///
/// Every variant means the entry cannot be processed; the batch runner turns
/// these into an `Error` result row rather than aborting the batch.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The input was empty (or whitespace only).
    #[error("invalid URL: empty input")]
    Empty,
    /// The input could not be parsed as a URL even after scheme inference.
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),
    /// The URL parsed but uses a scheme other than http or https.
    #[error("invalid URL: unsupported scheme {0:?} (only http/https)")]
    UnsupportedScheme(String),
    /// The URL parsed but has no host component.
    #[error("invalid URL: missing host")]
    MissingHost,
}

/// Canonicalizes a raw input string into an absolute http(s) URL.
///
/// - surrounding whitespace is trimmed;
/// - `https://` is prepended when no `http://`/`https://` prefix is present;
/// - the fragment is stripped (never part of a feed location);
/// - empty input, unparseable input, non-http(s) schemes, and hostless URLs
///   are rejected.
///
/// No side effects; the same input always yields the same output.
///
/// # Examples
///
/// ```
/// use feedscout::discover::normalize;
///
/// let url = normalize("example.com/blog").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/blog");
///
/// assert!(normalize("").is_err());
/// assert!(normalize("ftp://example.com").is_err());
/// ```
pub fn normalize(raw: &str) -> Result<Url, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Empty);
    }

    // Scheme inference by prefix check, not by parse-and-retry: a bare
    // "example.com:8080/x" would otherwise parse with scheme "example.com".
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(NormalizeError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none() {
        return Err(NormalizeError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
