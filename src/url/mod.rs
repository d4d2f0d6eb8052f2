//! URL handling module for Chunk-Crawler
//!
//! This module provides URL normalization, host extraction, wildcard matching,
//! and the scope predicate that decides which discovered links are eligible
//! for crawling.

mod domain;
mod matcher;
mod normalize;

use crate::config::ScopeConfig;
use crate::ConfigError;
use regex::Regex;
use url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::matches_wildcard;
pub use normalize::normalize_url;

/// Allow-list predicate over absolute URLs
///
/// A URL is in scope when it uses http(s) and either its host matches one of
/// the wildcard host patterns or the whole URL matches one of the regular
/// expressions. Everything else is denied, including every URL when both lists
/// are empty.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    domains: Vec<String>,
    patterns: Vec<Regex>,
}

impl ScopePolicy {
    /// Builds the policy, compiling every regular expression up front
    ///
    /// # Returns
    ///
    /// * `Ok(ScopePolicy)` - All patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - A regular expression is invalid
    pub fn from_config(config: &ScopeConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    ConfigError::InvalidPattern(format!("Invalid scope regex '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            domains: config.domains.iter().map(|d| d.to_lowercase()).collect(),
            patterns,
        })
    }

    /// Returns true if the URL may be enqueued
    ///
    /// # Examples
    ///
    /// ```
    /// use chunk_crawler::config::ScopeConfig;
    /// use chunk_crawler::url::ScopePolicy;
    /// use url::Url;
    ///
    /// let policy = ScopePolicy::from_config(&ScopeConfig {
    ///     seeds: vec![],
    ///     domains: vec!["*.example.com".to_string()],
    ///     patterns: vec![],
    /// })
    /// .unwrap();
    ///
    /// assert!(policy.allows(&Url::parse("https://blog.example.com/post").unwrap()));
    /// assert!(!policy.allows(&Url::parse("https://example.org/").unwrap()));
    /// ```
    pub fn allows(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        if let Some(host) = extract_domain(url) {
            if self.domains.iter().any(|d| matches_wildcard(d, &host)) {
                return true;
            }
        }

        self.patterns.iter().any(|re| re.is_match(url.as_str()))
    }

    /// Key under which fetches of this URL share one parallelism bound and
    /// one delay
    ///
    /// A host covered by a domain pattern is keyed by the first such pattern,
    /// so `*.example.com` throttles all of its subdomains together. Any other
    /// host is its own key.
    pub fn rate_scope(&self, url: &Url) -> String {
        let host = extract_domain(url).unwrap_or_default();
        self.domains
            .iter()
            .find(|d| matches_wildcard(d, &host))
            .cloned()
            .unwrap_or(host)
    }
}
