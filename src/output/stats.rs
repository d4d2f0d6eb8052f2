//! Run statistics and the end-of-run report

use crate::sink::DeliveryReport;
use crate::state::PageState;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Counters collected by the coordinator over one run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Fetches started
    pub urls_visited: u64,

    /// Terminal state of every page whose fetch completed
    pub pages_by_state: HashMap<PageState, u64>,

    /// Links rejected at admission, by reason
    pub links_too_deep: u64,
    pub links_out_of_scope: u64,
    pub links_already_visited: u64,

    /// Admitted URLs never fetched because the run was cancelled
    pub frontier_remaining: u64,

    pub chunks_created: u64,

    /// Present when a sink was configured
    pub delivery: Option<DeliveryReport>,

    /// True when the run was cancelled before completing
    pub partial: bool,

    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn record_page(&mut self, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    pub fn pages_in(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Pages fetched and chunked
    pub fn pages_processed(&self) -> u64 {
        self.pages_in(PageState::Processed)
    }

    /// Pages fetched but declined by the classifier
    pub fn pages_filtered(&self) -> u64 {
        self.pages_in(PageState::Filtered)
    }

    /// Fetches answered with a redirect
    pub fn pages_redirected(&self) -> u64 {
        self.pages_in(PageState::Redirected)
    }

    /// In-flight fetches abandoned on cancellation
    pub fn pages_abandoned(&self) -> u64 {
        self.pages_in(PageState::Abandoned)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// True if any page or chunk was lost along the way
    pub fn has_failures(&self) -> bool {
        self.fetch_failures() > 0
            || self
                .delivery
                .map_or(false, |d| d.failed > 0 || d.dropped > 0)
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport, result_file: Option<&Path>) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  URLs visited: {}", report.urls_visited);
    println!("  Pages processed: {}", report.pages_processed());
    println!("  Pages filtered: {}", report.pages_filtered());
    println!("  Redirects: {}", report.pages_redirected());
    println!("  Fetch failures: {}", report.fetch_failures());
    println!("  Chunks created: {}", report.chunks_created);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if report.fetch_failures() > 0 {
        println!("Failures by State:");
        let mut failures: Vec<_> = report
            .pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .collect();
        failures.sort_by(|a, b| b.1.cmp(a.1));

        for (state, count) in failures {
            println!("  {}: {}", state, count);
        }
        println!();
    }

    println!("Links Rejected:");
    println!("  Too deep: {}", report.links_too_deep);
    println!("  Out of scope: {}", report.links_out_of_scope);
    println!("  Already visited: {}", report.links_already_visited);
    println!();

    match &report.delivery {
        Some(delivery) => {
            println!("Delivery:");
            println!("  Attempted: {}", delivery.attempted);
            println!("  Succeeded: {}", delivery.succeeded);
            println!("  Failed: {}", delivery.failed);
            if delivery.dropped > 0 {
                println!("  Dropped on cancel: {}", delivery.dropped);
            }
        }
        None => println!("Delivery: disabled"),
    }
    println!();

    if report.partial {
        println!("⚠ Run was cancelled; results are partial");
        println!("  Fetches abandoned: {}", report.pages_abandoned());
        println!("  URLs left in frontier: {}", report.frontier_remaining);
    }

    match result_file {
        Some(path) => println!("✓ Results written to: {}", path.display()),
        None => println!("✗ Results were not written"),
    }
}
