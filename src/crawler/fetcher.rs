//! HTTP downloader implementation
//!
//! This module provides the [`Downloader`] used by the command line:
//! - Building HTTP clients from [`HttpConfig`]
//! - GET requests with redirect following delegated to reqwest
//! - Mapping status codes and transport failures to [`DownloadError`]
//! - Lazy link extraction from the downloaded body

use crate::config::HttpConfig;
use crate::crawler::downloader::{Downloader, Page};
use crate::crawler::parser::extract_links;
use crate::{DownloadError, ExtractError};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with the configured user agent, timeouts and redirect limit
///
/// # Example
///
/// ```
/// use bfs_crawler::config::HttpConfig;
/// use bfs_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads pages over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Creates a downloader with a client built from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a downloader around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Downloader for HttpDownloader {
    type Page = HtmlPage;

    async fn download(&self, url: &str) -> Result<HtmlPage, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownloadError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|source| DownloadError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::trace!("Fetched {} ({} bytes, {})", final_url, body.len(), content_type);

        Ok(HtmlPage {
            url: final_url,
            content_type,
            body,
        })
    }
}

/// A page fetched by [`HttpDownloader`]
#[derive(Debug, Clone)]
pub struct HtmlPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: String,

    /// Content-Type header value, empty if absent
    pub content_type: String,

    /// Response body
    pub body: String,
}

impl HtmlPage {
    /// Returns true if the body should be parsed for links
    ///
    /// Pages without a Content-Type header are given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        self.content_type.is_empty() || self.content_type.contains("html")
    }
}

impl Page for HtmlPage {
    async fn extract_links(&self) -> Result<Vec<String>, ExtractError> {
        if !self.is_html() {
            return Ok(Vec::new());
        }

        let base_url = Url::parse(&self.url).map_err(|e| ExtractError::Parse {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        Ok(extract_links(&self.body, &base_url))
    }
}
