use crate::config::CrawlerConfig;
use std::time::{Duration, Instant};

/// Tracks one rate scope (a domain pattern or a bare host) during crawling
///
/// The scheduler consults this before starting a fetch so that no scope has
/// more than `max_concurrent_pages_open` fetches in flight and successive
/// fetch starts are spaced by at least `minimum_time_on_page`.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of fetches started for this scope in the current run
    pub request_count: u32,

    /// Fetches started and not yet finished
    pub in_flight: u32,

    /// When the most recent fetch started
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    /// Creates a new DomainState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a fetch can start on this scope now
    ///
    /// # Returns
    ///
    /// * `true` - Below the parallelism bound and the minimum delay has elapsed
    /// * `false` - The fetch should wait
    pub fn can_request(&self, config: &CrawlerConfig, now: Instant) -> bool {
        self.in_flight < config.max_concurrent_pages_open
            && self.time_until_next_request(config, now).is_none()
    }

    /// Records that a fetch started
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.in_flight += 1;
        self.last_request_time = Some(now);
    }

    /// Records that a fetch finished (successfully or not)
    pub fn record_finished(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Calculates the time until the spacing rule allows the next fetch start
    ///
    /// Returns None if the delay has already elapsed. Does not account for the
    /// parallelism bound; a full scope becomes ready when a fetch finishes.
    pub fn time_until_next_request(
        &self,
        config: &CrawlerConfig,
        now: Instant,
    ) -> Option<Duration> {
        let last = self.last_request_time?;
        let min_delay = config.min_delay();
        let elapsed = now.saturating_duration_since(last);
        (elapsed < min_delay).then(|| min_delay - elapsed)
    }
}
