//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` capability
//! - Link admission (depth, scope, revisit suppression)
//! - Request scheduling and per-scope rate limiting
//! - Per-page fetch and extraction tasks
//! - Overall crawl coordination and cancellation

mod coordinator;
mod fetcher;
mod frontier;
mod page_task;
mod scheduler;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, is_html_content_type, FetchResult, HttpFetcher, PageFetcher};
pub use frontier::{Admission, Frontier};
pub use page_task::{process_page, PageOutcome, PageResult};
pub use scheduler::{QueuedUrl, Scheduler};

use crate::config::Config;
use crate::CrawlerError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher and, when `deliver` is set, the sink
/// 2. Seed the frontier
/// 3. Fetch pages, extract text and follow links
/// 4. Chunk each page and stream the chunks to the sink
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `deliver` - Whether to deliver chunks to the configured `[sink]`
/// * `cancel` - Cancels the run; committed chunks are still returned
pub async fn crawl(
    config: &Config,
    deliver: bool,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, CrawlerError> {
    Coordinator::from_config(config, deliver)?.run(cancel).await
}
