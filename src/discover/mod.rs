//! Feed discovery pipeline: normalize → generate candidates → validate.
//!
//! The three stages are pure or I/O-isolated and composed by the finder:
//!
//! - [`normalize`] - canonicalize a raw input string into an absolute URL
//! - [`candidates`] - derive an ordered candidate list from patterns, the
//!   homepage markup, and CMS platform signals
//! - [`validate`] - probe candidates in order, stopping at the first
//!   confirmed feed
//!
//! Only `validate` (and the homepage fetch in [`fetch_page`]) touches the
//! network; candidate generation is a pure function of its inputs, which is
//! what makes discovery deterministic and unit-testable without a server.

mod candidates;
mod normalize;
mod validate;

pub use candidates::generate;
pub use normalize::{normalize, NormalizeError};
pub use validate::{fetch_page, probe_candidate, sniff_feed_type, validate_candidates, ProbeError};
