//! Finder configuration, optionally loaded from a TOML file.
//!
//! All tunables live in one explicit [`FinderConfig`] passed into the finder
//! at construction — there is no process-wide mutable state. A missing config
//! file yields `FinderConfig::default()`; unknown keys are ignored by serde
//! but logged as potential typos. CLI flags override loaded values in `main`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// A platform signature used by the CMS-heuristic candidate strategy.
///
/// A signature matches when the homepage's `<meta name="generator">` content
/// contains `generator`, or when the raw HTML contains any of `markers`
/// (all comparisons lowercase). On a match, `feed_paths` are appended as
/// candidates. Signatures are consulted in table order, most specific first.
#[derive(Debug, Clone, Deserialize)]
pub struct CmsSignature {
    pub name: String,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub markers: Vec<String>,
    pub feed_paths: Vec<String>,
}

/// Top-level finder configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Maximum entries resolved concurrently.
    pub workers: usize,

    /// Per-fetch timeout in seconds (homepage and candidate probes alike).
    pub request_timeout_secs: u64,

    /// Overall budget for one entry's pipeline, in seconds. Bounds a host
    /// that is slow on every one of its candidates.
    pub entry_timeout_secs: u64,

    /// Maximum redirect hops followed per fetch before the candidate is
    /// treated as a redirect loop.
    pub max_redirects: usize,

    /// Global request rate shared by all fetches. 0 disables rate limiting.
    pub requests_per_second: f64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Generic feed path suffixes, probed in order against origin + path.
    pub patterns: Vec<String>,

    /// Platform signature table for the CMS-heuristic strategy.
    pub cms_signatures: Vec<CmsSignature>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            request_timeout_secs: 10,
            entry_timeout_secs: 60,
            max_redirects: 5,
            requests_per_second: 2.0,
            user_agent: concat!("feedscout/", env!("CARGO_PKG_VERSION")).to_string(),
            patterns: default_patterns(),
            cms_signatures: default_cms_signatures(),
        }
    }
}

/// Generic feed suffixes, in probe order. WordPress-only paths live in the
/// WordPress CMS signature instead, so unmatched sites are not probed with them.
fn default_patterns() -> Vec<String> {
    [
        "/feed",
        "/feed/",
        "/rss",
        "/rss.xml",
        "/feed.xml",
        "/atom.xml",
        "/index.xml",
        "/feed/atom",
        "/feed/rss",
        "/blog/feed",
        "/blog.atom",
        "/blog/index.rss",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_cms_signatures() -> Vec<CmsSignature> {
    fn sig(
        name: &str,
        generator: Option<&str>,
        markers: &[&str],
        feed_paths: &[&str],
    ) -> CmsSignature {
        CmsSignature {
            name: name.to_string(),
            generator: generator.map(String::from),
            markers: markers.iter().map(|m| m.to_string()).collect(),
            feed_paths: feed_paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    // Most specific platforms first; table order is probe order.
    vec![
        sig(
            "WordPress",
            Some("wordpress"),
            &["wp-content/", "wp-includes/"],
            &["/?feed=rss2", "/feed/wp-rss2.xml", "/wp-feed.php", "/wp-rss.php"],
        ),
        sig(
            "Ghost",
            Some("ghost"),
            &["/ghost/api/", "ghost-sdk.min.js"],
            &["/rss/"],
        ),
        sig(
            "Medium",
            None,
            &["cdn-client.medium.com", "medium.com/_/fp"],
            &["/feed"],
        ),
        sig(
            "Blogger",
            Some("blogger"),
            &["blogger.com/static"],
            &["/feeds/posts/default"],
        ),
        sig(
            "Squarespace",
            Some("squarespace"),
            &["squarespace.com"],
            &["?format=rss", "/blog?format=rss"],
        ),
        sig("Hugo", Some("hugo"), &[], &["/index.xml"]),
        sig("Jekyll", Some("jekyll"), &[], &["/feed.xml", "/atom.xml"]),
    ]
}

impl FinderConfig {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.entry_timeout_secs)
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(FinderConfig::default())`
    /// - Empty file → `Ok(FinderConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect likely typos
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "workers",
                "request_timeout_secs",
                "entry_timeout_secs",
                "max_redirects",
                "requests_per_second",
                "user_agent",
                "patterns",
                "cms_signatures",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: FinderConfig = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), workers = config.workers, "Loaded configuration");
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
