//! feedscout discovers RSS/Atom feed URLs for blog URLs and validates that
//! what it found is actually a working feed.
//!
//! The pipeline per blog URL: normalize the input, fetch the homepage once,
//! generate an ordered candidate list (explicit `<link>` declarations, then
//! well-known URL patterns, then CMS-specific paths, then feed-looking
//! anchors), and probe candidates in order until one is confirmed. Batches
//! run concurrently over a bounded worker pool, one result row per input row,
//! in input order.
//!
//! # Example
//!
//! ```no_run
//! use feedscout::{FeedFinder, FinderConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let finder = FeedFinder::new(FinderConfig::default())?;
//! let result = finder.find_feed("example.com/blog").await;
//! if let Some(feed_url) = &result.feed_url {
//!     println!("{} ({})", feed_url, result.feed_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discover;
pub mod io;
pub mod limiter;
pub mod types;

mod finder;

pub use config::{CmsSignature, ConfigError, FinderConfig};
pub use finder::{BatchSummary, FeedFinder};
pub use limiter::RateLimiter;
pub use types::{BlogEntry, Candidate, CandidateSource, FeedResult, FeedStatus, FeedType};
