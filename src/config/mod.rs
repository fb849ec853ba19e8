//! Configuration module for Corpus-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use corpus_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {} categories", config.categories.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryEntry, Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, SpreadConfig,
    UserAgentConfig, ValidatorConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

/// Minimal valid configuration shared by unit tests
#[cfg(test)]
pub(crate) const SAMPLE_CONFIG: &str = r#"
[crawler]
politeness-delay-ms = 0
request-timeout-secs = 5
timeout-retries = 0
oldest-article-date = "2020-01-01"

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
corpus-path = "data/corpus.tsv"

[site]
homepage = "https://www.bbc.com/pidgin"
base-url = "https://www.bbc.com"

[selectors]
pagination-list-class = "bbc-f8df6t e19602dz4"
article-count-span-class = "bbc-count"
headline-classes = ["bbc-headline"]
alt-headline-classes = ["bbc-strong-headline"]
story-div-class = "bbc-story"
article-date-class = "bbc-date"
topic-list-class = "bbc-topic"

[validator]
path-prefixes = ["/pidgin/"]
article-stubs = ["tori", "world", "sport", "media"]
deny-prefixes = ["/pidgin/topics", "/pidgin/media-", "/pidgin/bbc_pidgin_radio"]

[[category]]
name = "WORLD"
url = "https://www.bbc.com/pidgin/world"

[[category]]
name = "SPORT"
url = "https://www.bbc.com/pidgin/sport"

[[category]]
name = "MOST_POPULAR"
url = "https://www.bbc.com/pidgin/popular/read"
"#;

#[cfg(test)]
pub(crate) fn sample_config() -> Config {
    parse_config(SAMPLE_CONFIG).expect("sample config is valid")
}
