//! bfs-crawler main entry point
//!
//! This is the command-line interface for the breadth-first web crawler.

use anyhow::Context;
use bfs_crawler::config::{load_config, validate, Config};
use bfs_crawler::crawler::crawl;
use bfs_crawler::output::{print_summary, write_markdown_summary, CrawlStats};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// bfs-crawler: a bounded-concurrency breadth-first web crawler
///
/// Downloads every page reachable from URL within DEPTH levels, using
/// DOWNLOADERS concurrent downloads, EXTRACTORS concurrent link extractions,
/// and at most PER_HOST concurrent downloads against any one host.
#[derive(Parser, Debug)]
#[command(name = "bfs-crawler")]
#[command(version)]
#[command(about = "A bounded-concurrency breadth-first web crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum crawl depth (1 downloads only URL) [default: 1]
    #[arg(value_name = "DEPTH")]
    depth: Option<u32>,

    /// Number of concurrent downloads [default: 4]
    #[arg(value_name = "DOWNLOADERS")]
    downloaders: Option<usize>,

    /// Number of concurrent link extractions [default: 4]
    #[arg(value_name = "EXTRACTORS")]
    extractors: Option<usize>,

    /// Maximum concurrent downloads per host [default: 2]
    #[arg(value_name = "PER_HOST")]
    per_host: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip every URL containing this substring (repeatable)
    #[arg(short, long, value_name = "SUBSTRING")]
    exclude: Vec<String>,

    /// Write a markdown summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let depth = cli.depth.unwrap_or(1);

    let started_at = chrono::Utc::now();
    let result = crawl(&config, &cli.url, depth, &cli.exclude).await?;
    let finished_at = chrono::Utc::now();

    let stats = CrawlStats::from_result(&cli.url, depth, started_at, finished_at, &result);

    if !cli.quiet {
        print_summary(&stats, &result);
    }

    if let Some(path) = &cli.summary {
        write_markdown_summary(&stats, &result, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Loads the config file if given, then applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(downloaders) = cli.downloaders {
        config.crawler.downloaders = downloaders;
    }
    if let Some(extractors) = cli.extractors {
        config.crawler.extractors = extractors;
    }
    if let Some(per_host) = cli.per_host {
        config.crawler.per_host = per_host;
    }

    validate(&config)?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bfs_crawler=info,warn"),
            1 => EnvFilter::new("bfs_crawler=debug,info"),
            2 => EnvFilter::new("bfs_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
