//! Discovery of sub-topic categories that are not configured explicitly
//!
//! Article pages carry "related topic" navigation. Scanning the articles
//! linked from the homepage surfaces topic listings that can be crawled like
//! any configured category.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{resolve_link, PageParser, TopicLink};
use crate::output::category_sink_key;
use crate::url::{ArticleUrl, UrlValidator};
use crate::CrawlError;
use scraper::Html;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Result of a topic discovery pass
#[derive(Debug, Clone, Default)]
pub struct TopicDiscovery {
    /// New topics, name -> listing URL
    pub topics: BTreeMap<String, String>,

    /// Article pages that could not be scanned, with the reason
    pub failures: Vec<(String, String)>,
}

/// Mines related-topic links from article pages
#[derive(Clone)]
pub struct TopicDiscoverer {
    fetcher: PageFetcher,
    parser: Arc<dyn PageParser>,
    validator: Arc<dyn UrlValidator>,
    politeness_delay: Option<Duration>,
}

impl TopicDiscoverer {
    pub fn new(
        fetcher: PageFetcher,
        parser: Arc<dyn PageParser>,
        validator: Arc<dyn UrlValidator>,
        politeness_delay: Option<Duration>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            validator,
            politeness_delay,
        }
    }

    /// Finds topic listings reachable from the homepage's articles
    ///
    /// A topic is new when its URL is not in `known_urls` and its name does
    /// not share a sink with any of `known_names` or an earlier topic. Passing
    /// the previous result back in as known therefore finds nothing new.
    /// Failing to fetch the homepage is an error; failing to fetch an article
    /// is recorded in [`TopicDiscovery::failures`] and the scan moves on.
    pub async fn discover_topics(
        &self,
        homepage: &str,
        known_urls: &HashSet<String>,
        known_names: &HashSet<String>,
    ) -> Result<TopicDiscovery, CrawlError> {
        let body = self.fetcher.fetch(homepage).await?;
        let article_urls = self.article_links(&body);
        tracing::info!(
            "Scanning {} homepage articles for topics",
            article_urls.len()
        );

        let mut discovery = TopicDiscovery::default();
        let mut found_urls = HashSet::new();
        let mut taken_keys: HashSet<String> =
            known_names.iter().map(|n| category_sink_key(n)).collect();

        for (index, url) in article_urls.iter().enumerate() {
            if index > 0 {
                if let Some(delay) = self.politeness_delay {
                    tokio::time::sleep(delay).await;
                }
            }

            let body = match self.fetcher.fetch(url.as_str()).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Skipping topic scan of {}: {}", url, e);
                    discovery.failures.push((url.to_string(), e.to_string()));
                    continue;
                }
            };

            for topic in self.topic_links(&body) {
                let Some(topic_url) = Url::parse(url.as_str())
                    .ok()
                    .and_then(|base| resolve_link(&topic.href, &base))
                else {
                    continue;
                };

                if known_urls.contains(&topic_url) || found_urls.contains(&topic_url) {
                    continue;
                }

                let name = topic_name(&topic.text);
                if name.is_empty() || !taken_keys.insert(category_sink_key(&name)) {
                    tracing::debug!("Skipping topic {:?} at {}", topic.text, topic_url);
                    continue;
                }

                tracing::debug!("Found topic {} at {}", name, topic_url);
                found_urls.insert(topic_url.clone());
                discovery.topics.insert(name, topic_url);
            }
        }

        tracing::info!(
            "Discovered {} new topics ({} article pages failed)",
            discovery.topics.len(),
            discovery.failures.len()
        );
        Ok(discovery)
    }

    fn article_links(&self, body: &str) -> Vec<ArticleUrl> {
        let document = Html::parse_document(body);
        let mut urls: Vec<ArticleUrl> = self
            .parser
            .extract_links(&document)
            .iter()
            .filter_map(|href| self.validator.canonicalize(href))
            .collect();
        urls.sort();
        urls.dedup();
        urls
    }

    fn topic_links(&self, body: &str) -> Vec<TopicLink> {
        let document = Html::parse_document(body);
        self.parser.extract_topics(&document)
    }
}

/// Derives a stable category name from topic link text
///
/// Whitespace runs collapse to `_`, letters are uppercased and path
/// separators become `_`.
///
/// # Examples
///
/// ```
/// use corpus_crawler::crawler::topic_name;
///
/// assert_eq!(topic_name("  Nigeria   politics "), "NIGERIA_POLITICS");
/// assert_eq!(topic_name("Covid/Health"), "COVID_HEALTH");
/// ```
pub fn topic_name(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
        .replace(['/', '\\'], "_")
}
