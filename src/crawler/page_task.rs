//! Per-page fetch and extraction
//!
//! Each admitted URL is processed by one task. The task owns its page's text
//! accumulator from fetch to hand-off, so concurrently processed pages can
//! never see each other's text.

use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::scheduler::QueuedUrl;
use crate::extract::{parse_page, ParsedPage};
use crate::state::PageState;
use std::sync::Arc;
use url::Url;

/// What a page task hands back to the coordinator
#[derive(Debug)]
pub struct PageOutcome {
    /// The URL as admitted
    pub url: Url,

    /// Rate-limiting scope the fetch was counted against
    pub scope: String,

    pub depth: u32,

    pub result: PageResult,
}

#[derive(Debug)]
pub enum PageResult {
    /// Fetched and parsed; the page is ready for chunking
    Parsed {
        /// URL the body came from, used as the chunk source and link base
        final_url: Url,
        page: ParsedPage,
    },

    /// The server redirected; the target still has to pass admission
    Redirected { location: Url },

    /// The URL is abandoned
    Failed { state: PageState, reason: String },
}

/// Fetches one page and extracts its title, text and links
///
/// Parsing is synchronous and happens after the body is fully read, so no
/// parser state is held across an await point.
pub async fn process_page(fetcher: Arc<dyn PageFetcher>, queued: QueuedUrl) -> PageOutcome {
    tracing::debug!(url = %queued.url, depth = queued.depth, "Fetching page");

    let result = match fetcher.fetch(&queued.url).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
            ..
        } => {
            let page = parse_page(&body, &final_url);
            tracing::debug!(
                url = %final_url,
                status = status_code,
                chars = page.text.char_len(),
                links = page.links.len(),
                "Page parsed"
            );
            PageResult::Parsed { final_url, page }
        }
        FetchResult::Redirect {
            status_code,
            location,
        } => {
            tracing::debug!(
                url = %queued.url,
                status = status_code,
                location = %location,
                "Redirected"
            );
            PageResult::Redirected { location }
        }
        failure => PageResult::Failed {
            state: failure.failure_state().unwrap_or(PageState::Failed),
            reason: failure_reason(failure),
        },
    };

    PageOutcome {
        url: queued.url,
        scope: queued.scope,
        depth: queued.depth,
        result,
    }
}

fn failure_reason(failure: FetchResult) -> String {
    match failure {
        FetchResult::ContentMismatch { content_type } => format!("Expected HTML, got {}", content_type),
        FetchResult::HttpError { status_code, .. } => format!("HTTP {}", status_code),
        FetchResult::NetworkError { error, .. } => error,
        FetchResult::Success { .. } | FetchResult::Redirect { .. } => String::new(),
    }
}
