use serde::Deserialize;

/// Default number of downloader workers
pub const DEFAULT_DOWNLOADERS: usize = 4;

/// Default number of extractor workers
pub const DEFAULT_EXTRACTORS: usize = 4;

/// Default number of concurrent downloads allowed per host
pub const DEFAULT_PER_HOST: usize = 2;

/// Host-gate count above which idle gates are reclaimed between depths
pub const DEFAULT_HOST_GATE_SOFT_CAP: usize = 2048;

/// Main configuration structure for bfs-crawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
}

/// Crawler concurrency configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Size of the downloader worker pool
    pub downloaders: usize,

    /// Size of the link-extractor worker pool
    pub extractors: usize,

    /// Maximum number of concurrent downloads against a single host
    pub per_host: usize,

    /// Number of host-gates kept before idle ones are reclaimed
    pub host_gate_soft_cap: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            downloaders: DEFAULT_DOWNLOADERS,
            extractors: DEFAULT_EXTRACTORS,
            per_host: DEFAULT_PER_HOST,
            host_gate_soft_cap: DEFAULT_HOST_GATE_SOFT_CAP,
        }
    }
}

impl CrawlerConfig {
    /// Creates a crawler configuration with the given pool sizes and per-host cap
    pub fn new(downloaders: usize, extractors: usize, per_host: usize) -> Self {
        Self {
            downloaders,
            extractors,
            per_host,
            ..Self::default()
        }
    }
}

/// HTTP client configuration for [`crate::crawler::HttpDownloader`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}
