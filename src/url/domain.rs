use url::Url;

/// Extracts the scope key (lowercase host) from a URL
///
/// Rate limiting and parallelism bounds are applied per scope key. A trailing
/// root dot is dropped so `example.com.` and `example.com` share one scope.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use chunk_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.trim_end_matches('.').to_lowercase())
        .filter(|h| !h.is_empty())
}
