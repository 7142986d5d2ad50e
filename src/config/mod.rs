//! Configuration module for bfs-crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; an absent file means [`Config::default`].
//!
//! # Example
//!
//! ```no_run
//! use bfs_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Per-host cap: {}", config.crawler.per_host);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, HttpConfig, DEFAULT_DOWNLOADERS, DEFAULT_EXTRACTORS,
    DEFAULT_HOST_GATE_SOFT_CAP, DEFAULT_PER_HOST,
};

pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_crawler_config};
