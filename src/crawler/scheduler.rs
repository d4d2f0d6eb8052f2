//! Scheduler for managing the crawl frontier and rate limiting
//!
//! This module handles:
//! - Priority queue of admitted URLs (shallowest first, then discovery order)
//! - Per-scope parallelism bound
//! - Per-scope minimum delay between fetch starts
//!
//! The rate scope of a URL is the `[scope] domains` pattern covering its
//! host, or the lowercase host when no pattern does.

use crate::config::CrawlerConfig;
use crate::state::DomainState;
use crate::url::ScopePolicy;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// The URL to fetch (already normalized)
    pub url: Url,

    /// Rate-limiting scope of this URL
    pub scope: String,

    /// Hops from the nearest seed
    pub depth: u32,

    /// Insertion counter, keeps equal-depth URLs in discovery order
    seq: u64,
}

// Lower depth pops first; ties pop in insertion order
impl Ord for QueuedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .depth
            .cmp(&self.depth)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedUrl {}

/// Scheduler manages the frontier queue and rate limiting
///
/// The scheduler never sleeps; the coordinator asks for every URL that is
/// ready now and uses `time_until_ready` to decide how long to wait.
#[derive(Debug)]
pub struct Scheduler {
    /// Per-scope state tracking
    domain_states: HashMap<String, DomainState>,

    /// Frontier priority queue
    frontier: BinaryHeap<QueuedUrl>,

    /// Crawler configuration
    config: CrawlerConfig,

    /// Maps URLs to their rate scope
    scope: ScopePolicy,

    next_seq: u64,
}

impl Scheduler {
    pub fn new(config: CrawlerConfig, scope: ScopePolicy) -> Self {
        Self {
            domain_states: HashMap::new(),
            frontier: BinaryHeap::new(),
            config,
            scope,
            next_seq: 0,
        }
    }

    /// Adds an admitted URL to the frontier
    pub fn push(&mut self, url: Url, depth: u32) {
        let scope = self.scope.rate_scope(&url);
        self.frontier.push(QueuedUrl {
            url,
            scope,
            depth,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Takes the highest-priority URL whose scope may start a fetch now
    ///
    /// The fetch start is recorded against the scope; the caller must call
    /// `record_finished` when the fetch ends.
    pub fn next_ready(&mut self, now: Instant) -> Option<QueuedUrl> {
        let mut skipped = Vec::new();
        let mut found = None;

        while let Some(candidate) = self.frontier.pop() {
            let ready = self
                .domain_states
                .get(&candidate.scope)
                .map_or(true, |state| state.can_request(&self.config, now));

            if ready {
                found = Some(candidate);
                break;
            }
            skipped.push(candidate);
        }

        self.frontier.extend(skipped);

        let queued = found?;
        self.domain_states
            .entry(queued.scope.clone())
            .or_default()
            .record_request(now);
        Some(queued)
    }

    /// Releases the scope slot held by a finished fetch
    pub fn record_finished(&mut self, scope: &str) {
        if let Some(state) = self.domain_states.get_mut(scope) {
            state.record_finished();
        }
    }

    /// Shortest wait until a queued URL could become ready by elapsed time
    ///
    /// Scopes that are at their parallelism bound are ignored; they become
    /// ready when one of their fetches finishes. Returns None when nothing
    /// is waiting on a timer.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        self.frontier
            .iter()
            .filter_map(|queued| {
                let state = self.domain_states.get(&queued.scope)?;
                if state.in_flight >= self.config.max_concurrent_pages_open {
                    return None;
                }
                state.time_until_next_request(&self.config, now)
            })
            .min()
    }

    /// Number of URLs waiting in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Total fetches started across all scopes
    pub fn requests_started(&self) -> u64 {
        self.domain_states
            .values()
            .map(|s| u64::from(s.request_count))
            .sum()
    }
}
