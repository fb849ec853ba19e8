//! Corpus-Crawler: a polite multi-category news corpus builder
//!
//! This crate walks the paginated category listings of a news site, extracts
//! article text from the pages it finds, and merges the per-category results
//! into one deduplicated tab-separated corpus.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Corpus-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker for category {category} did not complete: {message}")]
    Worker { category: String, message: String },
}

impl CrawlError {
    /// Returns true if this error came from the fetch boundary
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::HttpStatus { .. } | Self::Timeout { .. } | Self::Reqwest(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown {kind} implementation: {key}")]
    UnknownImplementation { kind: &'static str, key: String },

    #[error("Invalid article count {0}: expected -1 or a positive number")]
    InvalidArticleCount(i64),
}

/// Result type alias for Corpus-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{ArticleRecord, CategorySpec, CategoryState, Quota};
pub use url::{ArticleUrl, UrlValidator};
