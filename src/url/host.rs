use crate::UrlError;
use url::Url;

/// Extracts the host from a URL string
///
/// The URL is parsed and its host portion is returned in lowercase. Ports,
/// paths, queries and fragments are ignored, so every URL on the same host
/// maps to the same host-gate.
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Ok(String)` - The lowercase host
/// * `Err(UrlError)` - The URL could not be parsed or has no host
///
/// # Examples
///
/// ```
/// use bfs_crawler::url::extract_host;
///
/// assert_eq!(extract_host("https://example.com/path").unwrap(), "example.com");
/// assert_eq!(extract_host("https://EXAMPLE.COM:8080/").unwrap(), "example.com");
/// assert!(extract_host("not a url").is_err());
/// ```
pub fn extract_host(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))
}
