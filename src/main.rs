use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use feedscout::{FeedFinder, FeedStatus, FinderConfig};

#[derive(Parser, Debug)]
#[command(
    name = "feedscout",
    about = "Discover and validate RSS/Atom feed URLs for blog URLs"
)]
struct Args {
    /// Input CSV with blog_title,blog_url columns
    #[arg(short, long, value_name = "FILE", requires = "output", conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, value_name = "FILE", requires = "input", conflicts_with = "url")]
    output: Option<PathBuf>,

    /// Resolve a single URL instead of a batch
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Optional TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Concurrent workers (overrides config)
    #[arg(long)]
    workers: Option<usize>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum redirect hops per fetch (overrides config)
    #[arg(long)]
    max_redirects: Option<usize>,

    /// Global requests per second, 0 to disable pacing (overrides config)
    #[arg(long)]
    rate: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FinderConfig::load(path).context("Failed to load config file")?,
        None => FinderConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(max_redirects) = args.max_redirects {
        config.max_redirects = max_redirects;
    }
    if let Some(rate) = args.rate {
        config.requests_per_second = rate;
    }

    let finder = FeedFinder::new(config).context("Failed to build HTTP client")?;

    if let Some(url) = &args.url {
        let result = finder.find_feed(url).await;
        match result.status {
            FeedStatus::Found => {
                // feed_url is always present on Found
                println!(
                    "{} ({})",
                    result.feed_url.as_deref().unwrap_or_default(),
                    result.feed_type
                );
            }
            FeedStatus::NotFound => {
                eprintln!("No feed found for {url}");
                std::process::exit(1);
            }
            FeedStatus::Error => {
                eprintln!(
                    "Error resolving {url}: {}",
                    result.error_message.as_deref().unwrap_or("unknown error")
                );
                std::process::exit(2);
            }
        }
        return Ok(());
    }

    let (input, output) = match (&args.input, &args.output) {
        (Some(input), Some(output)) => (input, output),
        _ => anyhow::bail!("Provide --input and --output for batch mode, or --url for a single lookup"),
    };

    let summary = finder
        .process_file(input, output)
        .await
        .context("Batch processing failed")?;

    println!(
        "Processed {} entries: {} found, {} not found, {} errors ({} malformed rows skipped)",
        summary.total, summary.found, summary.not_found, summary.errors, summary.skipped_rows
    );
    Ok(())
}
