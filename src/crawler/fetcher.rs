//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Reporting redirects to the caller instead of following them
//! - Rejecting non-HTML responses
//! - Classifying failures into page states

use crate::config::UserAgentConfig;
use crate::state::PageState;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// URL the body was served from
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value, if the server sent one
        content_type: Option<String>,
        /// Page body content
        body: String,
    },

    /// 3xx with a usable Location header
    ///
    /// The target is not fetched here; it goes back through admission like
    /// any discovered link, so the scope and no-revisit rules apply to it.
    Redirect {
        /// HTTP status code
        status_code: u16,
        /// Location resolved against the requested URL
        location: Url,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// HTTP error that maps to a specific page state
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// The page state this error maps to
        state: PageState,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The page state this error maps to
        state: PageState,
    },
}

impl FetchResult {
    /// Returns the terminal state for a failed fetch, or None on success
    pub fn failure_state(&self) -> Option<PageState> {
        match self {
            Self::Success { .. } | Self::Redirect { .. } => None,
            Self::ContentMismatch { .. } => Some(PageState::ContentMismatch),
            Self::HttpError { state, .. } | Self::NetworkError { state, .. } => Some(*state),
        }
    }
}

/// Capability to fetch one URL
///
/// The crawl loop only depends on this trait, so tests can substitute a
/// scripted fetcher for the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall timeout for a single request
///
/// # Example
///
/// ```no_run
/// use chunk_crawler::config::UserAgentConfig;
/// use chunk_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "ChunkCrawler".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
///     contact_email: "bot@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none()) // Redirects are admitted like links
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(
        user_agent: &UserAgentConfig,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, timeout)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL and classifies the outcome
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 3xx with Location | Redirect |
    /// | HTTP 404 / 410 | DeadLink |
    /// | Other non-2xx, 3xx without Location | Failed |
    /// | Content-Type present and not HTML | ContentMismatch |
    /// | Timeout, connection refused, TLS | Unreachable |
    ///
    /// No retries: a failed URL is abandoned.
    async fn fetch(&self, url: &Url) -> FetchResult {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        let final_url = response.url().clone();

        if status.is_redirection() {
            if let Some(location) = redirect_location(&response, &final_url) {
                return FetchResult::Redirect {
                    status_code: status.as_u16(),
                    location,
                };
            }
        }

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
                state: PageState::DeadLink,
            };
        }

        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
                state: PageState::Failed,
            };
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(ct) = &content_type {
            if !is_html_content_type(ct) {
                return FetchResult::ContentMismatch {
                    content_type: ct.clone(),
                };
            }
        }

        match response.text().await {
            Ok(body) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                content_type,
                body,
            },
            Err(e) => classify_error(&e),
        }
    }
}

/// Returns true for HTML media types, ignoring parameters such as charset
pub fn is_html_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    media_type == "text/html" || media_type == "application/xhtml+xml"
}

/// Resolves the Location header, which may be relative, against the request URL
fn redirect_location(response: &reqwest::Response, base: &Url) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    base.join(location.trim()).ok()
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            state: PageState::Unreachable,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            state: PageState::Unreachable,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            state: PageState::Failed,
        }
    }
}
