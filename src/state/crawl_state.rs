use crate::url::is_excluded;
use crate::PageError;
use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

/// Outcome of one crawl invocation
///
/// `downloaded` and the keys of `errors` are disjoint. The order of
/// `downloaded` is unspecified.
#[derive(Debug, Default)]
pub struct CrawlResult {
    /// URLs that were downloaded successfully
    pub downloaded: Vec<String>,

    /// Malformed URLs and failed downloads, keyed by URL
    pub errors: HashMap<String, PageError>,
}

impl CrawlResult {
    /// Returns true if nothing was downloaded and nothing failed
    pub fn is_empty(&self) -> bool {
        self.downloaded.is_empty() && self.errors.is_empty()
    }
}

/// Shared collections for a single crawl
///
/// Download and extraction tasks write here concurrently. The coordinator
/// only reads `next` after the level's barrier has drained.
#[derive(Debug, Default)]
pub struct CrawlState {
    visited: DashSet<String>,
    errors: DashMap<String, PageError>,
    next: DashSet<String>,
    excludes: Vec<String>,
}

impl CrawlState {
    /// Creates empty state for a crawl with the given exclusion substrings
    pub fn new(excludes: Vec<String>) -> Self {
        Self {
            excludes,
            ..Self::default()
        }
    }

    /// Returns true if `url` contains any exclusion substring
    pub fn is_excluded(&self, url: &str) -> bool {
        is_excluded(url, &self.excludes)
    }

    /// Returns true if `url` already reached a terminal state
    pub fn is_settled(&self, url: &str) -> bool {
        self.visited.contains(url) || self.errors.contains_key(url)
    }

    /// Returns true if a discovered link is worth queueing for the next level
    ///
    /// The check races with concurrent downloads by design; duplicates that
    /// slip through are skipped when their download task starts.
    pub fn is_novel(&self, link: &str) -> bool {
        !self.is_settled(link) && !self.is_excluded(link)
    }

    /// Records a successful download
    pub fn mark_visited(&self, url: String) {
        self.visited.insert(url);
    }

    /// Records a failure for `url`, keeping the first one if recorded twice
    pub fn record_error(&self, url: String, error: PageError) {
        self.errors.entry(url).or_insert(error);
    }

    /// Adds a link to the next level; returns false if it was already there
    pub fn push_next(&self, link: String) -> bool {
        self.next.insert(link)
    }

    /// Takes the next level's URLs, leaving it empty
    pub fn take_next(&self) -> Vec<String> {
        let links: Vec<String> = self.next.iter().map(|link| link.key().clone()).collect();
        self.next.clear();
        links
    }

    /// Number of URLs downloaded so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs that failed so far
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Moves everything recorded so far into a [`CrawlResult`]
    pub fn drain_result(&self) -> CrawlResult {
        let downloaded: Vec<String> = self.visited.iter().map(|url| url.key().clone()).collect();
        self.visited.clear();

        let keys: Vec<String> = self.errors.iter().map(|entry| entry.key().clone()).collect();
        let errors = keys
            .into_iter()
            .filter_map(|key| self.errors.remove(&key))
            .collect();

        CrawlResult { downloaded, errors }
    }
}
