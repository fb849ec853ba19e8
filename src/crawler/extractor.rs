//! Single article extraction

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{ArticleOutcome, PageParser};
use crate::state::ArticleRecord;
use crate::url::ArticleUrl;
use crate::CrawlError;
use chrono::NaiveDate;
use scraper::Html;
use std::sync::Arc;

/// What came out of one article page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The article has body text and can be written
    Accepted(ArticleRecord),

    /// Published on or before the cutoff date
    TooOld,

    /// Parsed fine but had no paragraph text
    NoContent,
}

/// Fetches article pages and turns them into records
#[derive(Clone)]
pub struct ArticleExtractor {
    fetcher: PageFetcher,
    parser: Arc<dyn PageParser>,
}

impl ArticleExtractor {
    pub fn new(fetcher: PageFetcher, parser: Arc<dyn PageParser>) -> Self {
        Self { fetcher, parser }
    }

    /// Extracts one article
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The article has body text
    /// * `Ok(None)` - Too old or no body; nothing to write
    /// * `Err(CrawlError)` - The page could not be fetched
    pub async fn extract(
        &self,
        url: &ArticleUrl,
        category: &str,
        cutoff: NaiveDate,
    ) -> Result<Option<ArticleRecord>, CrawlError> {
        match self.extract_outcome(url, category, cutoff).await? {
            Extraction::Accepted(record) => Ok(Some(record)),
            Extraction::TooOld | Extraction::NoContent => Ok(None),
        }
    }

    /// Like [`extract`](Self::extract) but reports why nothing was produced
    pub async fn extract_outcome(
        &self,
        url: &ArticleUrl,
        category: &str,
        cutoff: NaiveDate,
    ) -> Result<Extraction, CrawlError> {
        let body = self.fetcher.fetch(url.as_str()).await?;

        let document = Html::parse_document(&body);
        let outcome = self.parser.extract_article(&document, cutoff);

        let fields = match outcome {
            ArticleOutcome::TooOld { published } => {
                tracing::debug!("Skipping {} published {} (cutoff {})", url, published, cutoff);
                return Ok(Extraction::TooOld);
            }
            ArticleOutcome::Extracted(fields) => fields,
        };

        if fields.body.is_none() {
            tracing::debug!("No story text found in {}", url);
            return Ok(Extraction::NoContent);
        }

        Ok(Extraction::Accepted(ArticleRecord {
            headline: fields.headline,
            body: fields.body,
            category: category.to_string(),
            url: url.clone(),
            published_date: fields.published,
        }))
    }
}
