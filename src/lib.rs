//! bfs-crawler: a bounded-concurrency breadth-first web crawler
//!
//! This crate crawls outward from a seed URL level by level, downloading pages
//! through a fixed-size downloader pool, extracting links through a separate
//! extractor pool, and never letting more than a configured number of
//! downloads hit the same host at once.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for bfs-crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
///
/// Any of these recorded against a URL means the URL was malformed and was
/// never handed to a downloader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Failure reported by a [`crawler::Downloader`]
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {url} failed: {message}")]
    Failed { url: String, message: String },
}

/// Failure reported by [`crawler::Page::extract_links`]
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Link extraction failed for {url}: {message}")]
    Failed { url: String, message: String },
}

/// Per-URL error recorded in a crawl result
///
/// Only malformed URLs and failed downloads end up here. Extraction failures
/// are logged and otherwise dropped.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Malformed(#[from] UrlError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl PageError {
    /// Returns true if the URL could not be parsed for host extraction
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Returns true if the downloader reported the failure
    pub fn is_download_failure(&self) -> bool {
        matches!(self, Self::Download(_))
    }
}

/// Result type alias for bfs-crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, Downloader, HttpDownloader, Page, WebCrawler};
pub use url::{extract_host, is_excluded};
