//! Downloader and page abstractions consumed by the crawler
//!
//! The crawler never talks to the network itself. It calls a [`Downloader`]
//! from the downloader pool and, for pages that still have depth left, calls
//! [`Page::extract_links`] from the extractor pool.

use crate::{DownloadError, ExtractError};
use std::future::Future;

/// Fetches a page for a URL
///
/// Implementations must be safe to call concurrently from any pool worker.
/// Timeouts, redirects and retries are the implementation's business; the
/// crawler calls `download` at most once per URL per crawl.
pub trait Downloader: Send + Sync + 'static {
    /// The page handle produced by a successful download
    type Page: Page;

    /// Downloads `url`
    fn download(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Page, DownloadError>> + Send;
}

/// A downloaded page that can produce its outbound links
pub trait Page: Send + Sync + 'static {
    /// Returns the absolute URLs this page links to
    fn extract_links(&self) -> impl Future<Output = Result<Vec<String>, ExtractError>> + Send;
}
