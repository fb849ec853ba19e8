//! HTML parsers for listing and article pages
//!
//! Page layouts differ per site, so the crawl pipeline only talks to the
//! [`PageParser`] trait. This module handles:
//! - Candidate link extraction from listing pages
//! - Reading the pagination control
//! - Headline, body and publish date extraction from article pages
//! - Related-topic links used by topic discovery

use crate::config::{Config, SelectorConfig};
use crate::ConfigError;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Fields pulled from an article page that passed the date check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFields {
    /// Headline text; `None` when the layout has no recognizable headline
    pub headline: Option<String>,

    /// Paragraph text; `None` means the page had no content, never blank
    pub body: Option<String>,

    /// Publish date, when the page declares one
    pub published: Option<NaiveDate>,
}

/// Result of parsing an article page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// Article passed the date check
    Extracted(ArticleFields),

    /// Article was published on or before the cutoff date
    TooOld { published: NaiveDate },
}

/// A related-topic link found on an article page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLink {
    /// Link text as displayed
    pub text: String,

    /// Raw href attribute
    pub href: String,
}

/// Site-specific understanding of listing and article pages
pub trait PageParser: Send + Sync {
    /// Returns every candidate href on a page
    fn extract_links(&self, document: &Html) -> HashSet<String>;

    /// Returns the number of listing pages (at least 1)
    fn extract_page_count(&self, document: &Html) -> u32;

    /// Extracts article fields unless the article is older than `as_of`
    fn extract_article(&self, document: &Html, as_of: NaiveDate) -> ArticleOutcome;

    /// Returns the related-topic links of an article page
    fn extract_topics(&self, document: &Html) -> Vec<TopicLink>;
}

/// Builds the page parser selected by `site.parser`
pub fn build_parser(config: &Config) -> Result<Arc<dyn PageParser>, ConfigError> {
    match config.site.parser.to_ascii_lowercase().as_str() {
        "bbc" | "class-selector" => Ok(Arc::new(ClassSelectorParser::new(&config.selectors)?)),
        other => Err(ConfigError::UnknownImplementation {
            kind: "parser",
            key: other.to_string(),
        }),
    }
}

/// Parser for layouts identified by generated CSS class names
///
/// # Extraction Rules
///
/// - Page count: text of the last `<li>` in the pagination `<ul>`, then the
///   article-count `<span>`, otherwise 1
/// - Date: `datetime` attribute of the dated `<time>` element
/// - Headline: first `<h1>` with a headline class, then `<strong>` with an
///   alternate headline class
/// - Body: direct `<p>` children of every story `<div>`, in document order
/// - Topics: first link of every topic `<li>`
#[derive(Debug)]
pub struct ClassSelectorParser {
    links: Selector,
    pagination: Selector,
    list_item: Selector,
    article_count: Option<Selector>,
    date: Selector,
    headlines: Vec<Selector>,
    alt_headlines: Vec<Selector>,
    paragraphs: Selector,
    topics: Selector,
    topic_link: Selector,
}

impl ClassSelectorParser {
    pub fn new(selectors: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            links: parse_selector("a[href]")?,
            pagination: class_selector("ul", &selectors.pagination_list_class)?,
            list_item: parse_selector("li")?,
            article_count: selectors
                .article_count_span_class
                .as_deref()
                .map(|c| class_selector("span", c))
                .transpose()?,
            date: class_selector("time", &selectors.article_date_class)?,
            headlines: selectors
                .headline_classes
                .iter()
                .map(|c| class_selector("h1", c))
                .collect::<Result<_, _>>()?,
            alt_headlines: selectors
                .alt_headline_classes
                .iter()
                .map(|c| class_selector("strong", c))
                .collect::<Result<_, _>>()?,
            paragraphs: parse_selector(&format!(
                "{} > p",
                class_css("div", &selectors.story_div_class)
            ))?,
            topics: class_selector("li", &selectors.topic_list_class)?,
            topic_link: parse_selector("a[href]")?,
        })
    }

    fn extract_date(&self, document: &Html) -> Option<NaiveDate> {
        let datetime = document.select(&self.date).next()?.value().attr("datetime")?;
        let date_part = datetime.trim().get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    fn extract_headline(&self, document: &Html) -> Option<String> {
        self.headlines
            .iter()
            .chain(&self.alt_headlines)
            .find_map(|selector| document.select(selector).next())
            .map(|element| element_text(&element).trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_body(&self, document: &Html) -> Option<String> {
        let text = document
            .select(&self.paragraphs)
            .map(|p| element_text(&p))
            .collect::<Vec<_>>()
            .join(" ");

        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

impl PageParser for ClassSelectorParser {
    fn extract_links(&self, document: &Html) -> HashSet<String> {
        document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
            .collect()
    }

    fn extract_page_count(&self, document: &Html) -> u32 {
        let from_pagination = document.select(&self.pagination).next().and_then(|list| {
            list.select(&self.list_item)
                .last()
                .and_then(|li| parse_count(&element_text(&li)))
        });

        let from_span = || {
            self.article_count.as_ref().and_then(|selector| {
                document
                    .select(selector)
                    .next()
                    .and_then(|span| parse_count(&element_text(&span)))
            })
        };

        from_pagination.or_else(from_span).unwrap_or(1).max(1)
    }

    fn extract_article(&self, document: &Html, as_of: NaiveDate) -> ArticleOutcome {
        let published = self.extract_date(document);
        if let Some(date) = published {
            if date <= as_of {
                return ArticleOutcome::TooOld { published: date };
            }
        }

        ArticleOutcome::Extracted(ArticleFields {
            headline: self.extract_headline(document),
            body: self.extract_body(document),
            published,
        })
    }

    fn extract_topics(&self, document: &Html) -> Vec<TopicLink> {
        document
            .select(&self.topics)
            .filter_map(|item| {
                let href = item.select(&self.topic_link).next()?.value().attr("href")?;
                Some(TopicLink {
                    text: element_text(&item),
                    href: href.trim().to_string(),
                })
            })
            .collect()
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn parse_count(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

/// Builds `tag.class1.class2` from a space-separated class attribute value
fn class_css(tag: &str, classes: &str) -> String {
    let mut css = tag.to_string();
    for class in classes.split_whitespace() {
        css.push('.');
        css.push_str(class);
    }
    css
}

fn class_selector(tag: &str, classes: &str) -> Result<Selector, ConfigError> {
    parse_selector(&class_css(tag, classes))
}

fn parse_selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector(format!("{}: {:?}", css, e)))
}
