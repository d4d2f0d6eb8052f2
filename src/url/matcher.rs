/// Checks if a host matches a wildcard pattern
///
/// Two forms are supported:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Suffix match: "*.example.com" matches "example.com" itself and any
///    subdomain at any depth ("blog.example.com", "api.v2.example.com")
///
/// Both sides are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use chunk_crawler::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "other.com"));
///
/// assert!(matches_wildcard("*.cs.toronto.edu", "web.cs.toronto.edu"));
/// assert!(!matches_wildcard("*.cs.toronto.edu", "notcs.toronto.edu"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
