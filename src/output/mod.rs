//! Output module for run results
//!
//! This module handles:
//! - Writing the ordered chunk list of a run to a timestamped JSON file
//! - Collecting run counters and printing the end-of-run report

mod json;
pub mod stats;

pub use json::{result_file_name, write_results};
pub use stats::{print_report, CrawlReport};
