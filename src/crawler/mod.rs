//! Crawler module for breadth-first page downloading
//!
//! This module contains the core crawling logic, including:
//! - The downloader and page traits the crawler is generic over
//! - Fixed-size downloader and extractor worker pools
//! - Per-host admission control
//! - The level barrier and overall crawl coordination
//! - An HTTP downloader with HTML link extraction

mod barrier;
mod coordinator;
mod downloader;
mod fetcher;
mod host_gate;
mod parser;
mod pool;

pub use barrier::TaskBarrier;
pub use coordinator::WebCrawler;
pub use downloader::{Downloader, Page};
pub use fetcher::{build_http_client, HtmlPage, HttpDownloader};
pub use host_gate::HostGate;
pub use parser::extract_links;
pub use pool::{Job, PoolError, WorkerPool};

pub use crate::state::CrawlResult;

use crate::config::Config;
use crate::CrawlerError;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a one-off crawl. It will:
/// 1. Build the HTTP downloader from `config.http`
/// 2. Start both worker pools from `config.crawler`
/// 3. Crawl from `url` down to `depth` levels, skipping `excludes`
/// 4. Close the pools
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The crawl ran; per-URL failures are inside the result
/// * `Err(CrawlerError)` - The configuration or HTTP client was unusable
///
/// # Example
///
/// ```no_run
/// use bfs_crawler::config::Config;
/// use bfs_crawler::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = crawl(&Config::default(), "https://example.com/", 2, &[]).await?;
/// println!("{} pages downloaded", result.downloaded.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: &Config,
    url: &str,
    depth: u32,
    excludes: &[String],
) -> Result<CrawlResult, CrawlerError> {
    let downloader = HttpDownloader::new(&config.http)?;
    let crawler = WebCrawler::new(downloader, config.crawler.clone())?;

    let result = crawler.download_excluding(url, depth, excludes).await;
    crawler.close().await;

    Ok(result)
}
