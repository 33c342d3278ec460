//! CSV input and output.
//!
//! Input: a header row with `blog_url` (a bare `url` header is also accepted)
//! and optionally `blog_title`. Structurally malformed rows — unreadable CSV
//! or too few fields to contain the URL column — are skipped and counted,
//! never fatal. A row whose URL field is present but empty is kept: it flows
//! through the pipeline and comes back as an `Error` result row, so the
//! output stays one row per accepted input row.
//!
//! Output: `blog_url,feed_url,feed_type,status,error_message`, one row per
//! entry in input order. `feed_type` is written only for `Found` rows.

use crate::types::{BlogEntry, FeedResult, FeedStatus};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input is missing a blog_url (or url) column")]
    MissingUrlColumn,
}

/// Serialized shape of one output row; field order defines the header.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    blog_url: &'a str,
    feed_url: &'a str,
    feed_type: String,
    status: String,
    error_message: &'a str,
}

/// Reads the input batch. Returns the accepted entries in file order and the
/// number of skipped rows.
pub fn read_entries(path: &Path) -> Result<(Vec<BlogEntry>, usize), CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let url_index = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("blog_url"))
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case("url")))
        .ok_or(CsvError::MissingUrlColumn)?;
    let title_index = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("blog_title"));

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in reader.records().enumerate() {
        // Header is line 1, first record is line 2.
        let line = row + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping unreadable row");
                skipped += 1;
                continue;
            }
        };

        let Some(url) = record.get(url_index) else {
            tracing::warn!(line, "Skipping row with missing blog_url field");
            skipped += 1;
            continue;
        };

        let title = title_index
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        entries.push(BlogEntry {
            title,
            url: url.trim().to_string(),
        });
    }

    Ok((entries, skipped))
}

/// Writes the result rows, preserving the order given.
pub fn write_results(path: &Path, results: &[FeedResult]) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_path(path)?;

    for result in results {
        let feed_type = if result.status == FeedStatus::Found {
            result.feed_type.to_string()
        } else {
            String::new()
        };
        writer.serialize(ResultRow {
            blog_url: &result.blog_url,
            feed_url: result.feed_url.as_deref().unwrap_or(""),
            feed_type,
            status: result.status.to_string(),
            error_message: result.error_message.as_deref().unwrap_or(""),
        })?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedType;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("feedscout_io_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_basic_batch() {
        let path = write_temp(
            "basic.csv",
            "blog_title,blog_url\nExample,https://example.com\n,https://other.example\n",
        );
        let (entries, skipped) = read_entries(&path).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title.as_deref(), Some("Example"));
        assert_eq!(entries[0].url, "https://example.com");
        assert_eq!(entries[1].title, None);
    }

    #[test]
    fn test_read_accepts_url_header() {
        let path = write_temp("url_header.csv", "url\nhttps://example.com\n");
        let (entries, skipped) = read_entries(&path).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(entries[0].url, "https://example.com");
    }

    #[test]
    fn test_read_missing_url_column_is_error() {
        let path = write_temp("no_url.csv", "name,homepage\nExample,https://example.com\n");
        assert!(matches!(
            read_entries(&path),
            Err(CsvError::MissingUrlColumn)
        ));
    }

    #[test]
    fn test_read_skips_short_rows_keeps_empty_urls() {
        // Row 2 has no field at the blog_url position: skipped.
        // Row 3 has an explicitly empty blog_url: kept, so the pipeline can
        // report it as an Error result row.
        let path = write_temp(
            "short.csv",
            "blog_title,blog_url\nonly-a-title\nNo URL,\nOk,https://example.com\n",
        );
        let (entries, skipped) = read_entries(&path).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "");
        assert_eq!(entries[1].url, "https://example.com");
    }

    #[test]
    fn test_write_rows_in_given_order() {
        let dir = std::env::temp_dir().join("feedscout_io_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.csv");

        let results = vec![
            FeedResult::found("https://a.example", "https://a.example/feed", FeedType::Rss),
            FeedResult::not_found("https://b.example"),
            FeedResult::error("", "invalid URL: empty input"),
        ];
        write_results(&path, &results).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "blog_url,feed_url,feed_type,status,error_message");
        assert_eq!(
            lines[1],
            "https://a.example,https://a.example/feed,RSS,Found,"
        );
        assert_eq!(lines[2], "https://b.example,,,NotFound,");
        assert_eq!(lines[3], ",,,Error,invalid URL: empty input");
    }

    #[test]
    fn test_feed_type_blank_unless_found() {
        let dir = std::env::temp_dir().join("feedscout_io_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("types.csv");

        write_results(&path, &[FeedResult::not_found("https://x.example")]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("Unknown"));
    }
}
