//! Candidate feed URL generation.
//!
//! Produces an ordered, deduplicated list of candidate feed URLs for a base
//! URL from three source classes, in four priority bands (lower tries first):
//!
//! 1. `<link rel="alternate">` tags — explicit author-declared feed links,
//!    the most trustworthy signal, in document order;
//! 2. generic URL-pattern suffixes from the configured pattern list;
//! 3. CMS-specific paths appended when a platform signature matches;
//! 4. feed-looking `<a href>` anchors — the weakest signal, probed last.
//!
//! Generation is a pure function of its inputs: the same base URL, HTML, and
//! configuration always yield the same candidates in the same order. When the
//! homepage HTML is unavailable the HTML-derived bands are skipped and the
//! pattern band still runs (degraded mode, not an error).

use crate::config::{CmsSignature, FinderConfig};
use crate::types::{Candidate, CandidateSource};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// Priority bands. Within a band, candidates are numbered in discovery order.
const BAND_LINK_TAG: u32 = 0;
const BAND_PATTERN: u32 = 100;
const BAND_CMS: u32 = 200;
const BAND_ANCHOR: u32 = 300;

const FEED_MIME_TYPES: [&str; 2] = ["application/rss+xml", "application/atom+xml"];

/// Words that mark an anchor as feed-looking, matched against href and text.
const ANCHOR_KEYWORDS: [&str; 4] = ["rss", "feed", "atom", "subscribe"];

/// Generates the ordered candidate list for `base`.
///
/// `homepage_html` is the body of a prior fetch of `base` performed by the
/// caller; `None` means that fetch failed and only the pattern strategy runs.
/// Candidates with identical resolved URLs are merged, keeping the
/// earliest-tried occurrence.
pub fn generate(base: &Url, homepage_html: Option<&str>, config: &FinderConfig) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    let doc = homepage_html.map(Html::parse_document);

    if let Some(doc) = &doc {
        for (i, url) in link_tag_urls(doc, base).into_iter().enumerate() {
            candidates.push(Candidate {
                url,
                source: CandidateSource::HtmlLink,
                priority: BAND_LINK_TAG + i as u32,
            });
        }
    }

    for (i, suffix) in config.patterns.iter().enumerate() {
        if let Some(url) = join_suffix(base, suffix) {
            candidates.push(Candidate {
                url,
                source: CandidateSource::PatternMatch,
                priority: BAND_PATTERN + i as u32,
            });
        }
    }

    if let (Some(doc), Some(html)) = (&doc, homepage_html) {
        let html_lower = html.to_lowercase();
        let mut cms_index = 0u32;
        for signature in matching_signatures(doc, &html_lower, &config.cms_signatures) {
            tracing::debug!(base = %base, cms = %signature.name, "CMS signature matched");
            for suffix in &signature.feed_paths {
                if let Some(url) = join_suffix(base, suffix) {
                    candidates.push(Candidate {
                        url,
                        source: CandidateSource::CmsHeuristic,
                        priority: BAND_CMS + cms_index,
                    });
                    cms_index += 1;
                }
            }
        }

        for (i, url) in anchor_urls(doc, base).into_iter().enumerate() {
            candidates.push(Candidate {
                url,
                source: CandidateSource::HtmlLink,
                priority: BAND_ANCHOR + i as u32,
            });
        }
    }

    // Bands are generated in ascending priority, so a single pass keeps the
    // earliest-tried occurrence of each URL.
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.url.as_str().to_owned()));
    candidates
}

/// Joins a pattern/CMS suffix onto the base URL's origin + path.
///
/// `https://example.com/blog` + `/feed` → `https://example.com/blog/feed`;
/// query-style suffixes (`?format=rss`) append directly. Returns `None` for
/// suffixes that produce an unparseable URL.
fn join_suffix(base: &Url, suffix: &str) -> Option<Url> {
    let origin = base.origin().ascii_serialization();
    let path = base.path().trim_end_matches('/');
    Url::parse(&format!("{origin}{path}{suffix}")).ok()
}

/// Extracts feed URLs from `<link rel="alternate">` tags, in document order.
fn link_tag_urls(doc: &Html, base: &Url) -> Vec<Url> {
    let mut urls = Vec::new();
    if let Ok(selector) = Selector::parse(r#"link[rel="alternate"]"#) {
        for element in doc.select(&selector) {
            let is_feed = element
                .value()
                .attr("type")
                .map(|t| {
                    let t = t.trim().to_lowercase();
                    FEED_MIME_TYPES.iter().any(|m| t.starts_with(m))
                })
                .unwrap_or(false);
            if !is_feed {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                if let Ok(resolved) = base.join(href) {
                    if matches!(resolved.scheme(), "http" | "https") {
                        urls.push(resolved);
                    }
                }
            }
        }
    }
    urls
}

/// Returns the signatures matching the homepage, in table order.
///
/// A signature matches when the `<meta name="generator">` content contains
/// its generator marker, or the raw HTML contains any of its marker strings.
fn matching_signatures<'a>(
    doc: &Html,
    html_lower: &str,
    signatures: &'a [CmsSignature],
) -> Vec<&'a CmsSignature> {
    let generator = meta_generator(doc).map(|g| g.to_lowercase());

    signatures
        .iter()
        .filter(|sig| {
            let generator_hit = match (&sig.generator, &generator) {
                (Some(needle), Some(content)) => content.contains(needle),
                _ => false,
            };
            generator_hit || sig.markers.iter().any(|m| html_lower.contains(m.as_str()))
        })
        .collect()
}

fn meta_generator(doc: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="generator"]"#).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(str::to_owned)
}

/// Extracts feed-looking anchors (`<a href>` whose href or text mentions
/// rss/feed/atom/subscribe), in document order.
fn anchor_urls(doc: &Html, base: &Url) -> Vec<Url> {
    let mut urls = Vec::new();
    if let Ok(selector) = Selector::parse("a[href]") {
        for element in doc.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("javascript:")
            {
                continue;
            }

            let href_lower = href.to_lowercase();
            let text = element.text().collect::<String>().to_lowercase();
            let looks_feedish = ANCHOR_KEYWORDS
                .iter()
                .any(|k| href_lower.contains(k) || text.contains(k));
            if !looks_feedish {
                continue;
            }

            if let Ok(resolved) = base.join(href) {
                if matches!(resolved.scheme(), "http" | "https") {
                    urls.push(resolved);
                }
            }
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    fn config() -> FinderConfig {
        FinderConfig::default()
    }

    fn urls(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    // --- Pattern strategy ---

    #[test]
    fn test_patterns_only_when_html_missing() {
        let candidates = generate(&base(), None, &config());
        assert_eq!(candidates.len(), config().patterns.len());
        assert!(candidates
            .iter()
            .all(|c| c.source == CandidateSource::PatternMatch));
        assert_eq!(candidates[0].url.as_str(), "https://example.com/feed");
    }

    #[test]
    fn test_patterns_join_onto_base_path() {
        let base = Url::parse("https://example.com/blog").unwrap();
        let candidates = generate(&base, None, &config());
        assert_eq!(candidates[0].url.as_str(), "https://example.com/blog/feed");
    }

    #[test]
    fn test_trailing_slash_does_not_double() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let candidates = generate(&base, None, &config());
        assert_eq!(candidates[0].url.as_str(), "https://example.com/blog/feed");
    }

    // --- HTML link-tag strategy ---

    #[test]
    fn test_link_tag_candidate_precedes_patterns() {
        let html = r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="/feed.xml">
        </head><body></body></html>"#;
        let candidates = generate(&base(), Some(html), &config());

        assert_eq!(candidates[0].url.as_str(), "https://example.com/feed.xml");
        assert_eq!(candidates[0].source, CandidateSource::HtmlLink);
        let first_pattern = candidates
            .iter()
            .position(|c| c.source == CandidateSource::PatternMatch)
            .unwrap();
        assert!(candidates[0].priority < candidates[first_pattern].priority);
    }

    #[test]
    fn test_link_tags_preserve_document_order() {
        let html = r#"<html><head>
            <link rel="alternate" type="application/atom+xml" href="/atom.xml">
            <link rel="alternate" type="application/rss+xml" href="/rss.xml">
        </head></html>"#;
        let candidates = generate(&base(), Some(html), &config());
        assert_eq!(candidates[0].url.as_str(), "https://example.com/atom.xml");
        assert_eq!(candidates[1].url.as_str(), "https://example.com/rss.xml");
    }

    #[test]
    fn test_link_tag_absolute_href_kept() {
        let html = r#"<link rel="alternate" type="application/rss+xml"
                       href="https://feeds.example.net/blog">"#;
        let candidates = generate(&base(), Some(html), &config());
        assert_eq!(candidates[0].url.as_str(), "https://feeds.example.net/blog");
    }

    #[test]
    fn test_non_feed_link_tags_ignored() {
        let html = r#"<html><head>
            <link rel="alternate" type="text/html" href="/mobile">
            <link rel="stylesheet" href="/style.css">
        </head></html>"#;
        let candidates = generate(&base(), Some(html), &config());
        assert!(candidates
            .iter()
            .all(|c| c.source != CandidateSource::HtmlLink));
    }

    #[test]
    fn test_mime_type_with_charset_parameter_accepted() {
        let html = r#"<link rel="alternate"
            type="application/rss+xml; charset=utf-8" href="/feed.xml">"#;
        let candidates = generate(&base(), Some(html), &config());
        assert_eq!(candidates[0].url.as_str(), "https://example.com/feed.xml");
    }

    // --- CMS-heuristic strategy ---

    #[test]
    fn test_wordpress_generator_meta_adds_cms_paths() {
        let html = r#"<html><head>
            <meta name="generator" content="WordPress 6.4.2">
        </head><body></body></html>"#;
        let candidates = generate(&base(), Some(html), &config());
        let cms: Vec<_> = candidates
            .iter()
            .filter(|c| c.source == CandidateSource::CmsHeuristic)
            .collect();
        assert!(!cms.is_empty());
        assert_eq!(cms[0].url.as_str(), "https://example.com/?feed=rss2");
    }

    #[test]
    fn test_wordpress_marker_without_generator_meta() {
        let html = r#"<html><body>
            <script src="/wp-content/themes/x/app.js"></script>
        </body></html>"#;
        let candidates = generate(&base(), Some(html), &config());
        assert!(candidates
            .iter()
            .any(|c| c.source == CandidateSource::CmsHeuristic));
    }

    #[test]
    fn test_cms_paths_follow_patterns() {
        let html = r#"<meta name="generator" content="Ghost 5.0">"#;
        let candidates = generate(&base(), Some(html), &config());
        let last_pattern = candidates
            .iter()
            .filter(|c| c.source == CandidateSource::PatternMatch)
            .map(|c| c.priority)
            .max()
            .unwrap();
        let first_cms = candidates
            .iter()
            .find(|c| c.source == CandidateSource::CmsHeuristic)
            .unwrap();
        assert!(first_cms.priority > last_pattern);
        assert_eq!(first_cms.url.as_str(), "https://example.com/rss/");
    }

    #[test]
    fn test_no_cms_candidates_without_signals() {
        let html = "<html><body><p>A hand-written site</p></body></html>";
        let candidates = generate(&base(), Some(html), &config());
        assert!(candidates
            .iter()
            .all(|c| c.source != CandidateSource::CmsHeuristic));
    }

    #[test]
    fn test_query_style_suffix_appends_directly() {
        let html = r#"<meta name="generator" content="Squarespace">"#;
        let candidates = generate(&base(), Some(html), &config());
        assert!(candidates
            .iter()
            .any(|c| c.url.as_str() == "https://example.com?format=rss"
                || c.url.as_str() == "https://example.com/?format=rss"));
    }

    // --- Anchor strategy (lowest band) ---

    #[test]
    fn test_feedish_anchor_lands_in_last_band() {
        let html = r#"<html><body>
            <a href="/subscribe.xml">Subscribe via RSS</a>
        </body></html>"#;
        let candidates = generate(&base(), Some(html), &config());
        let anchor = candidates
            .iter()
            .find(|c| c.url.as_str() == "https://example.com/subscribe.xml")
            .unwrap();
        assert_eq!(anchor.source, CandidateSource::HtmlLink);
        let max_other = candidates
            .iter()
            .filter(|c| c.url.as_str() != anchor.url.as_str())
            .map(|c| c.priority)
            .max()
            .unwrap();
        assert!(anchor.priority > max_other);
    }

    #[test]
    fn test_plain_anchors_ignored() {
        let html = r##"<a href="/about">About us</a><a href="#top">Top</a>"##;
        let candidates = generate(&base(), Some(html), &config());
        assert!(!candidates
            .iter()
            .any(|c| c.url.as_str().contains("/about")));
    }

    // --- Dedup and determinism ---

    #[test]
    fn test_duplicate_urls_keep_earliest_band() {
        // "/feed" appears both as a link tag href and as the first pattern.
        let html = r#"<link rel="alternate" type="application/rss+xml" href="/feed">"#;
        let candidates = generate(&base(), Some(html), &config());
        let hits: Vec<_> = candidates
            .iter()
            .filter(|c| c.url.as_str() == "https://example.com/feed")
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, CandidateSource::HtmlLink);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let html = r#"<html><head>
            <meta name="generator" content="WordPress 6.4">
            <link rel="alternate" type="application/rss+xml" href="/feed.xml">
        </head><body><a href="/rss">RSS</a></body></html>"#;
        let first = generate(&base(), Some(html), &config());
        let second = generate(&base(), Some(html), &config());
        assert_eq!(urls(&first), urls(&second));
    }
}
