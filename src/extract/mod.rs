//! Page content extraction
//!
//! This module turns a fetched HTML body into the pieces the crawl needs:
//! - The visible text of the page as one normalized string (`PageText`)
//! - The page title
//! - Absolute links discovered on the page

mod page;
mod text;

pub use page::{parse_page, resolve_link, ParsedPage};
pub use text::{extract_text, PageText, EXCLUDED_TAGS};
