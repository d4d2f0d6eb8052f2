//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`/`RunState`: the run-level state machine (Idle, Running, Draining, Done)
//! - `DomainState`: per-scope parallelism and request spacing
//! - `PageState`: what happened to an individual URL

mod domain_state;
mod page_state;
mod run_state;

// Re-export main types
pub use domain_state::DomainState;
pub use page_state::PageState;
pub use run_state::{CrawlPhase, RunState};
