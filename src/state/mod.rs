//! State module for tracking crawl progress
//!
//! This module provides the data model shared by the crawl pipeline.
//!
//! # Components
//!
//! - `CategorySpec`: A named category and its first listing page
//! - `CategoryState`: Per-category discovery progress (URLs found, next page)
//! - `Quota`: How many accepted articles a category may contribute
//! - `ArticleRecord`: One extracted article ready to be written

mod category_state;
mod quota;
mod record;

// Re-export main types
pub use category_state::{CategorySpec, CategoryState};
pub use quota::Quota;
pub use record::ArticleRecord;
