/// Checks whether a URL is excluded by any of the given substrings
///
/// A URL is excluded if at least one entry of `excludes` occurs anywhere in
/// it. The check is plain substring containment on the raw URL string; no
/// normalization is applied. An empty exclusion set excludes nothing.
///
/// # Arguments
///
/// * `url` - The URL to test
/// * `excludes` - Substrings that mark a URL as excluded
///
/// # Examples
///
/// ```
/// use bfs_crawler::url::is_excluded;
///
/// let excludes = vec!["/skip".to_string()];
/// assert!(is_excluded("http://a/skip/here", &excludes));
/// assert!(!is_excluded("http://a/ok", &excludes));
/// assert!(!is_excluded::<String>("http://a/skip", &[]));
/// ```
pub fn is_excluded<S: AsRef<str>>(url: &str, excludes: &[S]) -> bool {
    excludes.iter().any(|pattern| url.contains(pattern.as_ref()))
}
