//! URL handling module for Corpus-Crawler
//!
//! This module decides which hrefs found on listing pages are real article
//! URLs and turns them into canonical absolute [`ArticleUrl`]s. Article URL
//! rules differ per site locale, so they sit behind the [`UrlValidator`]
//! trait and are picked by the `validator.locale` configuration key.

mod validator;

use crate::config::Config;
use crate::ConfigError;
use std::fmt;
use std::sync::Arc;

pub use validator::{SectionRuleValidator, StubRuleValidator};

/// A validated, absolute article URL (scheme, host and path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleUrl(String);

impl ArticleUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArticleUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Locale-specific article URL predicate
///
/// Implementations must be total: any string, however malformed, yields
/// `true` or `false` and never panics.
pub trait UrlValidator: Send + Sync {
    /// Returns true if `href` points at an article
    fn is_valid(&self, href: &str) -> bool;

    /// Scheme and host that relative hrefs are resolved against
    fn base_url(&self) -> &str;

    /// Returns the canonical absolute URL for a valid href
    fn canonicalize(&self, href: &str) -> Option<ArticleUrl> {
        if !self.is_valid(href) {
            return None;
        }
        let path = site_path(href, self.base_url());
        Some(ArticleUrl(format!("{}{}", self.base_url(), path)))
    }
}

/// Strips the site prefix from an href, leaving the path
///
/// Hrefs pointing at other hosts are returned unchanged (trimmed), so they
/// never match a path rule.
pub(crate) fn site_path<'a>(href: &'a str, base_url: &str) -> &'a str {
    let href = href.trim();
    href.strip_prefix(base_url).unwrap_or(href)
}

/// Builds the validator selected by `validator.locale`
///
/// # Supported locales
///
/// | Key | Implementation |
/// |-----|----------------|
/// | `stub`, `pcm` | [`StubRuleValidator`] |
/// | `section`, `sw` | [`SectionRuleValidator`] |
pub fn build_validator(config: &Config) -> Result<Arc<dyn UrlValidator>, ConfigError> {
    let rules = &config.validator;
    let base_url = &config.site.base_url;

    match rules.locale.to_ascii_lowercase().as_str() {
        "stub" | "pcm" => Ok(Arc::new(StubRuleValidator::new(base_url, rules))),
        "section" | "sw" => Ok(Arc::new(SectionRuleValidator::new(base_url, rules))),
        other => Err(ConfigError::UnknownImplementation {
            kind: "validator",
            key: other.to_string(),
        }),
    }
}
