//! Admission policy for discovered links
//!
//! The coordinator task owns the `Frontier` exclusively, so admission
//! decisions are serialized and the visited set needs no lock.

use crate::url::{normalize_url, ScopePolicy};
use std::collections::HashSet;
use url::Url;

/// Outcome of offering a link to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Marked visited; the caller must enqueue it at the offered depth
    Admitted(Url),

    /// Depth would exceed `max_depth`
    DepthExceeded,

    /// Fails the scope predicate
    OutOfScope,

    /// Already admitted earlier in this run
    AlreadyVisited,

    /// Not an absolute http(s) URL
    Invalid,
}

/// Visited set plus the depth and scope rules
#[derive(Debug)]
pub struct Frontier {
    scope: ScopePolicy,
    max_depth: u32,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new(scope: ScopePolicy, max_depth: u32) -> Self {
        Self {
            scope,
            max_depth,
            visited: HashSet::new(),
        }
    }

    /// Decides whether an absolute URL discovered at `depth` is crawled
    ///
    /// Checks run in order: normalize, depth, scope, visited. Only an
    /// `Admitted` result marks the URL visited, so a link rejected for depth
    /// or scope never blocks the same page from another route.
    pub fn admit(&mut self, href: &str, depth: u32) -> Admission {
        let url = match normalize_url(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!(href, error = %e, "Discarding link");
                return Admission::Invalid;
            }
        };

        if depth > self.max_depth {
            return Admission::DepthExceeded;
        }

        if !self.scope.allows(&url) {
            return Admission::OutOfScope;
        }

        if !self.visited.insert(url.as_str().to_string()) {
            return Admission::AlreadyVisited;
        }

        Admission::Admitted(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
