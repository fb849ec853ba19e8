use chrono::NaiveDate;
use serde::Deserialize;

/// Main configuration structure for Corpus-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub site: SiteConfig,
    pub selectors: SelectorConfig,
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub spread: SpreadConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

impl Config {
    /// Looks up a configured category by name, ignoring ASCII case
    pub fn find_category(&self, name: &str) -> Option<&CategoryEntry> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause between consecutive requests of one worker (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// How many times a timed out request is re-issued
    #[serde(rename = "timeout-retries", default = "default_timeout_retries")]
    pub timeout_retries: u32,

    /// How many times a failed category discovery is resumed before giving up
    #[serde(rename = "category-retries", default)]
    pub category_retries: u32,

    /// Maximum number of categories crawled at once (0 = number of cores)
    #[serde(rename = "max-concurrent-categories", default)]
    pub max_concurrent_categories: usize,

    /// Articles published on or before this date are skipped
    #[serde(rename = "oldest-article-date")]
    pub oldest_article_date: NaiveDate,
}

fn default_politeness_delay() -> u64 {
    10_000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_timeout_retries() -> u32 {
    2
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

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the merged corpus; per-category sinks are written next to it
    #[serde(rename = "corpus-path")]
    pub corpus_path: String,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site homepage, used by topic discovery
    pub homepage: String,

    /// Scheme and host prepended to relative article hrefs
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Page parser implementation key
    #[serde(default = "default_parser")]
    pub parser: String,

    /// Mine extra topic categories when crawling every category
    #[serde(rename = "discover-topics", default)]
    pub discover_topics: bool,
}

fn default_parser() -> String {
    "bbc".to_string()
}

/// Structural selectors consumed by the page parser
///
/// Class values may contain several space-separated classes, all of which
/// must be present on the element.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(rename = "pagination-list-class")]
    pub pagination_list_class: String,

    #[serde(rename = "article-count-span-class", default)]
    pub article_count_span_class: Option<String>,

    #[serde(rename = "headline-classes", default)]
    pub headline_classes: Vec<String>,

    #[serde(rename = "alt-headline-classes", default)]
    pub alt_headline_classes: Vec<String>,

    #[serde(rename = "story-div-class")]
    pub story_div_class: String,

    #[serde(rename = "article-date-class")]
    pub article_date_class: String,

    #[serde(rename = "topic-list-class")]
    pub topic_list_class: String,
}

/// Article URL rules for one locale
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorConfig {
    /// Validator implementation key ("stub" or "section")
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Leading paths an article href must start with
    #[serde(rename = "path-prefixes")]
    pub path_prefixes: Vec<String>,

    /// First hyphen-delimited stub tokens accepted for non-numeric stubs
    #[serde(rename = "article-stubs", default)]
    pub article_stubs: Vec<String>,

    /// Navigation, topic and media sections that are never articles
    #[serde(rename = "deny-prefixes", default)]
    pub deny_prefixes: Vec<String>,

    /// Leading paths under which any single stub is an article
    #[serde(rename = "always-valid-prefixes", default)]
    pub always_valid_prefixes: Vec<String>,
}

fn default_locale() -> String {
    "stub".to_string()
}

/// Spread allocation settings
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadConfig {
    /// Single-page category whose whole feed is always collected
    #[serde(rename = "fixed-category", default = "default_fixed_category")]
    pub fixed_category: String,

    /// Number of articles the fixed category always holds
    #[serde(rename = "fixed-size", default = "default_fixed_size")]
    pub fixed_size: usize,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            fixed_category: default_fixed_category(),
            fixed_size: default_fixed_size(),
        }
    }
}

fn default_fixed_category() -> String {
    "MOST_POPULAR".to_string()
}

fn default_fixed_size() -> usize {
    10
}

/// One configured category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Category name (e.g. "WORLD")
    pub name: String,

    /// First listing page of the category
    pub url: String,
}
