//! Configuration module for Chunk-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every check runs before the first network request, so a bad chunking or
//! scope setting is reported at startup rather than discovered mid-crawl.
//!
//! # Example
//!
//! ```no_run
//! use chunk_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ChunkingConfig, ClassifierConfig, Config, CrawlerConfig, OutputConfig, ScopeConfig,
    SinkConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
