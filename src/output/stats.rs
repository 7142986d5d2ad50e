//! Statistics for a finished crawl
//!
//! This module summarises a [`CrawlResult`] and prints it to the console.

use crate::state::CrawlResult;
use crate::url::extract_host;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// The seed URL
    pub seed: String,

    /// Requested maximum depth
    pub depth: u32,

    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl finished
    pub finished_at: DateTime<Utc>,

    /// Number of downloaded pages
    pub downloaded: usize,

    /// Number of malformed URLs
    pub malformed: usize,

    /// Number of failed downloads
    pub failed: usize,

    /// Downloaded pages per host, sorted by host
    pub pages_by_host: BTreeMap<String, usize>,
}

impl CrawlStats {
    /// Computes statistics for `result`
    pub fn from_result(
        seed: &str,
        depth: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        result: &CrawlResult,
    ) -> Self {
        let mut pages_by_host = BTreeMap::new();
        for url in &result.downloaded {
            if let Ok(host) = extract_host(url) {
                *pages_by_host.entry(host).or_insert(0) += 1;
            }
        }

        let malformed = result.errors.values().filter(|e| e.is_malformed()).count();

        Self {
            seed: seed.to_string(),
            depth,
            started_at,
            finished_at,
            downloaded: result.downloaded.len(),
            malformed,
            failed: result.errors.len() - malformed,
            pages_by_host,
        }
    }

    /// Wall-clock duration of the crawl in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Total number of recorded errors
    pub fn total_errors(&self) -> usize {
        self.malformed + self.failed
    }

    /// Percentage of attempted URLs that downloaded successfully
    pub fn success_rate(&self) -> f64 {
        let attempted = self.downloaded + self.total_errors();
        if attempted == 0 {
            0.0
        } else {
            (self.downloaded as f64 / attempted as f64) * 100.0
        }
    }
}

/// Prints a crawl result and its statistics to stdout
///
/// Downloaded URLs are listed first (sorted), then every error as
/// `url -> error`.
pub fn print_summary(stats: &CrawlStats, result: &CrawlResult) {
    println!("=== Crawl of {} (depth {}) ===\n", stats.seed, stats.depth);

    println!("Downloaded ({}):", stats.downloaded);
    let mut downloaded: Vec<_> = result.downloaded.iter().collect();
    downloaded.sort();
    for url in downloaded {
        println!("  {}", url);
    }
    println!();

    if !result.errors.is_empty() {
        println!("Errors ({}):", stats.total_errors());
        let mut errors: Vec<_> = result.errors.iter().collect();
        errors.sort_by(|a, b| a.0.cmp(b.0));
        for (url, error) in errors {
            println!("  {} -> {}", url, error);
        }
        println!();
    }

    println!(
        "Finished in {} ms, success rate {:.1}% across {} hosts",
        stats.duration_ms(),
        stats.success_rate(),
        stats.pages_by_host.len()
    );
}
