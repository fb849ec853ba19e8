//! Crawler module for category discovery and article extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeout retries
//! - Pluggable page parsing and link extraction
//! - Paginated per-category URL discovery
//! - Topic discovery and quota allocation
//! - Overall crawl coordination

mod category;
mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod quota;
mod topics;

pub use category::{page_url, CategoryCrawler};
pub use coordinator::{CategorySelection, Coordinator, RunOptions};
pub use extractor::{ArticleExtractor, Extraction};
pub use fetcher::{build_http_client, PageFetcher};
pub use parser::{
    build_parser, resolve_link, ArticleFields, ArticleOutcome, ClassSelectorParser, PageParser,
    TopicLink,
};
pub use quota::{allocate_quotas, merge_limit, CapPolicy};
pub use topics::{topic_name, TopicDiscoverer, TopicDiscovery};

use crate::config::Config;
use crate::output::RunSummary;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the fetcher, page parser and URL validator
/// 2. Resolve the categories, discovering topics if enabled
/// 3. Crawl every category on a bounded worker pool
/// 4. Merge the category sinks into the final corpus
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `options` - Per-run controls
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed; individual categories may still have failed
/// * `Err(CrawlError)` - Configuration, topic discovery or merge failed
pub async fn crawl(config: Config, options: RunOptions) -> Result<RunSummary, CrawlError> {
    Coordinator::new(config, options)?.run().await
}
