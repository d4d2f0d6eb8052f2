use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Chunk-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub scope: ScopeConfig,
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,
    pub output: OutputConfig,
    #[serde(default)]
    pub sink: Option<SinkConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from seed URLs (seeds are depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent page fetches per rate scope
    #[serde(rename = "max-concurrent-pages-open")]
    pub max_concurrent_pages_open: u32,

    /// Minimum time between fetch starts in one rate scope (milliseconds)
    #[serde(rename = "minimum-time-on-page")]
    pub minimum_time_on_page: u64,

    /// Timeout for a single page fetch (milliseconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Optional deadline for the whole run (seconds, 0 = none)
    #[serde(rename = "max-run-seconds", default)]
    pub max_run_seconds: u64,
}

impl CrawlerConfig {
    /// Minimum spacing between fetch starts within one scope
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.minimum_time_on_page)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    /// Run deadline, if one is configured
    pub fn max_run_duration(&self) -> Option<Duration> {
        (self.max_run_seconds > 0).then(|| Duration::from_secs(self.max_run_seconds))
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Seeds and the allow-list that bounds the crawl
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Absolute URLs the crawl starts from
    pub seeds: Vec<String>,

    /// Host patterns (e.g., "example.com" or "*.example.com")
    #[serde(default)]
    pub domains: Vec<String>,

    /// Regular expressions matched against the full absolute URL
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Sliding-window chunking parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    #[serde(rename = "max-chunk-length")]
    pub max_chunk_length: usize,

    /// Characters repeated from the end of one chunk at the start of the next
    #[serde(rename = "overlap-length")]
    pub overlap_length: usize,
}

/// Optional keyword pre-filter in front of the chunker
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Case-insensitive keywords searched in the title and page text
    pub keywords: Vec<String>,

    /// Number of distinct keywords a page must contain to be chunked
    #[serde(rename = "min-matches", default = "default_min_matches")]
    pub min_matches: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the timestamped result file is written to
    pub directory: String,

    /// Result file name prefix
    #[serde(rename = "file-prefix", default = "default_file_prefix")]
    pub file_prefix: String,
}

/// Embedding-ingestion endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Full URL chunks are POSTed to
    pub endpoint: String,

    /// Destination index name sent with every chunk
    #[serde(rename = "collection-name")]
    pub collection_name: String,

    /// Timeout for one delivery (milliseconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Pause between consecutive deliveries (milliseconds)
    #[serde(rename = "delivery-delay", default = "default_delivery_delay")]
    pub delivery_delay: u64,

    /// Capacity of the channel between the chunker and the sink
    #[serde(rename = "queue-capacity", default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl SinkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    pub fn delivery_delay(&self) -> Duration {
        Duration::from_millis(self.delivery_delay)
    }
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_min_matches() -> usize {
    1
}

fn default_file_prefix() -> String {
    "crawled_chunks".to_string()
}

fn default_delivery_delay() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    256
}
