//! URL helpers for bfs-crawler
//!
//! This module provides host extraction (which keys the per-host gates) and
//! the substring exclusion predicate applied to seeds and discovered links.

mod host;
mod matcher;

pub use host::extract_host;
pub use matcher::is_excluded;
