//! The finder object and batch runner.
//!
//! [`FeedFinder`] owns the HTTP client, the rate limiter, and the
//! configuration; every lookup — single or batched — runs the same pipeline:
//! normalize → fetch homepage → generate candidates → validate. Entry
//! pipelines share no mutable state with each other; the batch runner fans
//! them out over a bounded worker pool and restores input order afterwards.

use crate::config::FinderConfig;
use crate::discover;
use crate::io::{self, CsvError};
use crate::limiter::RateLimiter;
use crate::types::{BlogEntry, FeedResult, FeedStatus};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Aggregate counts for one `process_file` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Entries processed (one result row each).
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
    /// Input rows dropped by the CSV reader before processing.
    pub skipped_rows: usize,
}

/// Discovers and validates feed URLs for blog URLs.
///
/// Construct once with a [`FinderConfig`] and reuse: the underlying HTTP
/// client pools connections, and the rate limiter paces requests globally
/// across all concurrent lookups.
pub struct FeedFinder {
    config: FinderConfig,
    client: reqwest::Client,
    limiter: RateLimiter,
}

impl FeedFinder {
    /// Builds the finder and its HTTP client.
    ///
    /// The redirect hop bound and User-Agent come from the configuration;
    /// redirect-policy violations surface per candidate as skippable
    /// failures, never as construction errors.
    pub fn new(config: FinderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            // Total-time bound including body reads; the per-call timeout in
            // the probe layer only covers the send.
            .timeout(config.request_timeout())
            .build()?;
        let limiter = RateLimiter::new(config.requests_per_second);
        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Resolves a single blog URL to a feed.
    ///
    /// Always returns a [`FeedResult`] — failures of any kind (bad input,
    /// unreachable host, nothing found, pipeline overrunning the per-entry
    /// budget) are encoded in its `status`, never raised.
    pub async fn find_feed(&self, raw_url: &str) -> FeedResult {
        match tokio::time::timeout(self.config.entry_timeout(), self.resolve(raw_url)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(blog = %raw_url, "Entry exceeded overall time budget");
                FeedResult::error(raw_url, "entry timed out")
            }
        }
    }

    async fn resolve(&self, raw_url: &str) -> FeedResult {
        let base = match discover::normalize(raw_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(input = %raw_url, error = %e, "Rejected input URL");
                return FeedResult::error(raw_url, e.to_string());
            }
        };

        // Degraded mode on failure: pattern candidates alone still work.
        let homepage = match discover::fetch_page(
            &self.client,
            &self.limiter,
            self.config.request_timeout(),
            &base,
        )
        .await
        {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!(url = %base, error = %e, "Homepage fetch failed, probing patterns only");
                None
            }
        };

        let candidates = discover::generate(&base, homepage.as_deref(), &self.config);
        tracing::debug!(url = %base, candidates = candidates.len(), "Candidate list generated");

        discover::validate_candidates(
            &self.client,
            &self.limiter,
            self.config.request_timeout(),
            raw_url,
            candidates,
        )
        .await
    }

    /// Resolves a batch of entries concurrently.
    ///
    /// Returns exactly one result per entry, in input order, regardless of
    /// completion order. A failure in one entry's pipeline never aborts the
    /// batch.
    pub async fn run(&self, entries: Vec<BlogEntry>) -> Vec<FeedResult> {
        if entries.is_empty() {
            return Vec::new();
        }

        let total = entries.len();
        let completed = AtomicUsize::new(0);
        let workers = self.config.workers.max(1);

        let mut indexed: Vec<(usize, FeedResult)> = stream::iter(entries.into_iter().enumerate())
            .map(|(index, entry)| {
                let completed = &completed;
                async move {
                    let result = self.find_feed(&entry.url).await;
                    let done = completed.fetch_add(1, Ordering::Relaxed).saturating_add(1);
                    tracing::info!(
                        done,
                        total,
                        blog = %entry.url,
                        status = %result.status,
                        "Entry resolved"
                    );
                    (index, result)
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        // buffer_unordered yields in completion order; the output contract
        // is input order.
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }

    /// Batch mode: read an input CSV, resolve every entry, write the output
    /// CSV, and return the aggregate counts.
    pub async fn process_file(&self, input: &Path, output: &Path) -> Result<BatchSummary, CsvError> {
        let (entries, skipped_rows) = io::read_entries(input)?;
        tracing::info!(
            entries = entries.len(),
            skipped = skipped_rows,
            input = %input.display(),
            "Input batch loaded"
        );

        let results = self.run(entries).await;
        io::write_results(output, &results)?;

        let mut summary = BatchSummary {
            total: results.len(),
            skipped_rows,
            ..Default::default()
        };
        for result in &results {
            match result.status {
                FeedStatus::Found => summary.found += 1,
                FeedStatus::NotFound => summary.not_found += 1,
                FeedStatus::Error => summary.errors += 1,
            }
        }

        tracing::info!(
            total = summary.total,
            found = summary.found,
            not_found = summary.not_found,
            errors = summary.errors,
            output = %output.display(),
            "Batch complete"
        );
        Ok(summary)
    }
}
