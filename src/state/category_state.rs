use crate::url::ArticleUrl;
use std::collections::HashSet;

/// A named section of the site and its first listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategorySpec {
    pub name: String,
    pub entry_url: String,
}

impl CategorySpec {
    pub fn new(name: impl Into<String>, entry_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_url: entry_url.into(),
        }
    }
}

/// Discovery progress of one category
///
/// The URL set only grows. URLs keep the order of the page they were first
/// seen on, duplicates are dropped. `next_page` makes the walk resumable: a
/// crawl interrupted by a failed fetch continues from the page that failed.
#[derive(Debug, Clone)]
pub struct CategoryState {
    category: CategorySpec,
    urls: Vec<ArticleUrl>,
    seen: HashSet<ArticleUrl>,
    next_page: u32,
    total_pages: Option<u32>,
    pages_fetched: u32,
}

impl CategoryState {
    pub fn new(category: CategorySpec) -> Self {
        Self {
            category,
            urls: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            total_pages: None,
            pages_fetched: 0,
        }
    }

    pub fn category(&self) -> &CategorySpec {
        &self.category
    }

    /// Adds URLs found on one page, returning how many were new
    pub fn add_urls(&mut self, urls: impl IntoIterator<Item = ArticleUrl>) -> usize {
        let before = self.urls.len();
        for url in urls {
            if self.seen.insert(url.clone()) {
                self.urls.push(url);
            }
        }
        self.urls.len() - before
    }

    /// Marks the current page as fetched and moves to the next one
    pub fn complete_page(&mut self) {
        self.pages_fetched += 1;
        self.next_page += 1;
    }

    pub fn set_total_pages(&mut self, total: u32) {
        self.total_pages = Some(total.max(1));
    }

    /// Returns true once every known page has been fetched
    pub fn is_exhausted(&self) -> bool {
        self.total_pages
            .is_some_and(|total| self.next_page > total)
    }

    pub fn urls(&self) -> &[ArticleUrl] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &ArticleUrl) -> bool {
        self.seen.contains(url)
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}
