//! Core data model for feed discovery.
//!
//! A [`BlogEntry`] goes in, exactly one [`FeedResult`] comes out. In between,
//! the candidate generator produces transient [`Candidate`] values that are
//! consumed by the validator and never persisted.

use std::fmt;
use url::Url;

/// One input row: a blog to find a feed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogEntry {
    /// Optional human-readable title (informational only).
    pub title: Option<String>,
    /// The blog URL as provided by the input source. Required, non-empty.
    pub url: String,
}

/// Where a candidate feed URL came from.
///
/// Try-order is determined by [`Candidate::priority`], but the source is kept
/// for logging and for the dedup rule (earliest band wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// A generic well-known suffix such as `/feed` or `/rss.xml`.
    PatternMatch,
    /// Derived from the homepage HTML: `<link rel="alternate">` tags, or
    /// feed-looking `<a href>` anchors in the lowest band.
    HtmlLink,
    /// A platform-specific path appended after a CMS signature matched.
    CmsHeuristic,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::PatternMatch => write!(f, "pattern"),
            CandidateSource::HtmlLink => write!(f, "html-link"),
            CandidateSource::CmsHeuristic => write!(f, "cms"),
        }
    }
}

/// A candidate feed URL awaiting validation.
///
/// Candidates are generated transiently per resolution attempt; lower
/// `priority` values are tried first. Ordering is deterministic for
/// identical inputs: the pattern list and CMS table are fixed, and
/// HTML-derived candidates preserve document order.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub url: Url,
    pub source: CandidateSource,
    pub priority: u32,
}

/// Feed format detected for a validated candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    Rss,
    Atom,
    /// The server declared a feed Content-Type but the root element was
    /// neither `<rss>` nor `<feed>`.
    #[default]
    Unknown,
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedType::Rss => write!(f, "RSS"),
            FeedType::Atom => write!(f, "Atom"),
            FeedType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Outcome class for a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// A candidate was confirmed reachable with feed-like content.
    Found,
    /// Every candidate was probed and none was a feed.
    NotFound,
    /// The entry could not be processed at all (bad URL, timeout, no candidates).
    Error,
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedStatus::Found => write!(f, "Found"),
            FeedStatus::NotFound => write!(f, "NotFound"),
            FeedStatus::Error => write!(f, "Error"),
        }
    }
}

/// The unit of output: one per input [`BlogEntry`], immutable once produced.
///
/// `blog_url` echoes the raw input string (not the normalized URL) so output
/// rows remain joinable back to input rows even when normalization rewrote
/// or rejected the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResult {
    pub blog_url: String,
    /// Final post-redirect feed URL. `Some` if and only if `status == Found`.
    pub feed_url: Option<String>,
    pub feed_type: FeedType,
    pub status: FeedStatus,
    pub error_message: Option<String>,
}

impl FeedResult {
    pub fn found(blog_url: impl Into<String>, feed_url: impl Into<String>, feed_type: FeedType) -> Self {
        Self {
            blog_url: blog_url.into(),
            feed_url: Some(feed_url.into()),
            feed_type,
            status: FeedStatus::Found,
            error_message: None,
        }
    }

    pub fn not_found(blog_url: impl Into<String>) -> Self {
        Self {
            blog_url: blog_url.into(),
            feed_url: None,
            feed_type: FeedType::Unknown,
            status: FeedStatus::NotFound,
            error_message: None,
        }
    }

    pub fn error(blog_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            blog_url: blog_url.into(),
            feed_url: None,
            feed_type: FeedType::Unknown,
            status: FeedStatus::Error,
            error_message: Some(message.into()),
        }
    }
}
