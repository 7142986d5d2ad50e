//! Output module for crawl reports
//!
//! This module handles:
//! - Computing statistics for a finished crawl
//! - Printing the result to the console
//! - Generating markdown summaries

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{print_summary, CrawlStats};

use thiserror::Error;

/// Errors raised while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for output operations
pub type OutputResult<T> = Result<T, OutputError>;
