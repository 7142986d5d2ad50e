//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the `visited`, `errors` and next-level collections shared by
//!   every task of one crawl
//! - `CrawlResult`: what a finished crawl hands back to the caller

mod crawl_state;

pub use crawl_state::{CrawlResult, CrawlState};
