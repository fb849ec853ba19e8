//! Paginated article URL discovery for one category
//!
//! Listing pages are walked strictly in order: page `n` is only requested
//! after the links of page `n - 1` have been accumulated.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::PageParser;
use crate::state::{CategorySpec, CategoryState, Quota};
use crate::url::{ArticleUrl, UrlValidator};
use crate::CrawlError;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Walks the listing pages of a category and collects article URLs
#[derive(Clone)]
pub struct CategoryCrawler {
    fetcher: PageFetcher,
    parser: Arc<dyn PageParser>,
    validator: Arc<dyn UrlValidator>,
    politeness_delay: Duration,
}

impl CategoryCrawler {
    pub fn new(
        fetcher: PageFetcher,
        parser: Arc<dyn PageParser>,
        validator: Arc<dyn UrlValidator>,
        politeness_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            parser,
            validator,
            politeness_delay,
        }
    }

    /// Discovers the article URLs of a category from scratch
    ///
    /// # Arguments
    ///
    /// * `category` - The category to walk
    /// * `quota` - Stop fetching pages once this many URLs are known
    /// * `delay` - Pause between consecutive page fetches
    ///
    /// # Returns
    ///
    /// * `Ok(CategoryState)` - All pages fetched, or the quota was reached
    /// * `Err(CrawlError)` - A listing page could not be fetched
    pub async fn discover(
        &self,
        category: &CategorySpec,
        quota: Quota,
        delay: bool,
    ) -> Result<CategoryState, CrawlError> {
        let mut state = CategoryState::new(category.clone());
        self.resume(&mut state, quota, delay).await?;
        Ok(state)
    }

    /// Continues discovery from `state.next_page()`
    ///
    /// On error the state keeps every URL accumulated so far and still points
    /// at the page that failed, so calling `resume` again retries only that
    /// page onwards.
    pub async fn resume(
        &self,
        state: &mut CategoryState,
        quota: Quota,
        delay: bool,
    ) -> Result<(), CrawlError> {
        let name = state.category().name.clone();

        if state.total_pages().is_none() {
            let entry_url = state.category().entry_url.clone();
            let (urls, total_pages) = self.fetch_listing(&entry_url).await?;
            let found = urls.len();
            state.add_urls(urls);
            state.complete_page();
            state.set_total_pages(total_pages);

            tracing::info!("{} urls in page 1 gotten for {}", found, name);
            tracing::info!("{} page(s) found for {}", total_pages, name);
        }

        loop {
            if state.is_exhausted() {
                break;
            }

            if quota.is_satisfied(state.len()) {
                tracing::info!(
                    "{} urls already satisfy quota {} for {}, skipping remaining pages",
                    state.len(),
                    quota,
                    name
                );
                break;
            }

            if delay && !self.politeness_delay.is_zero() {
                tokio::time::sleep(self.politeness_delay).await;
            }

            let page = state.next_page();
            let url = page_url(&state.category().entry_url, page)?;
            let (urls, _) = self.fetch_listing(&url).await?;
            let found = urls.len();
            state.add_urls(urls);
            state.complete_page();

            tracing::info!("{} urls in page {} gotten for {}", found, page, name);
        }

        Ok(())
    }

    /// Fetches one listing page and returns its article URLs and page count
    async fn fetch_listing(&self, url: &str) -> Result<(Vec<ArticleUrl>, u32), CrawlError> {
        let body = self.fetcher.fetch(url).await?;

        let document = Html::parse_document(&body);
        let mut urls: Vec<ArticleUrl> = self
            .parser
            .extract_links(&document)
            .iter()
            .filter_map(|href| self.validator.canonicalize(href))
            .collect();
        let total_pages = self.parser.extract_page_count(&document);

        urls.sort();
        urls.dedup();
        Ok((urls, total_pages))
    }
}

/// Builds the URL of listing page `page` of a category
pub fn page_url(entry_url: &str, page: u32) -> Result<String, CrawlError> {
    let mut url = Url::parse(entry_url)?;
    url.query_pairs_mut().append_pair("page", &page.to_string());
    Ok(url.to_string())
}
