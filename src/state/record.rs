use crate::url::ArticleUrl;
use chrono::NaiveDate;

/// One extracted article
///
/// Records only leave the extractor with a non-blank body; a missing
/// headline is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub headline: Option<String>,
    pub body: Option<String>,
    pub category: String,
    pub url: ArticleUrl,
    pub published_date: Option<NaiveDate>,
}

impl ArticleRecord {
    /// Returns true if the record carries body text worth persisting
    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }
}
