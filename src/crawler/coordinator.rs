//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the top-level driver that coordinates a run:
//! - Resolving the category set (configured plus discovered topics)
//! - Allocating per-category quotas
//! - Running one worker per category on a bounded pool
//! - Merging the category sinks once every worker has finished

use crate::config::Config;
use crate::crawler::category::CategoryCrawler;
use crate::crawler::extractor::{ArticleExtractor, Extraction};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{build_parser, PageParser};
use crate::crawler::quota::{allocate_quotas, merge_limit, CapPolicy};
use crate::crawler::topics::TopicDiscoverer;
use crate::output::{
    category_sink_key, category_sink_path, merge_corpora, remove_sinks, CategoryReport,
    CorpusWriter, RunSummary,
};
use crate::state::{CategorySpec, CategoryState, Quota};
use crate::url::{build_validator, UrlValidator};
use crate::{ConfigError, CrawlError};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Which categories a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection {
    /// Every configured category, plus discovered topics when enabled
    All,

    /// Only the named categories
    Named(Vec<String>),
}

impl CategorySelection {
    /// Parses `all` or a comma-separated list of names
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("all") {
            return Self::All;
        }

        Self::Named(
            value
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }
}

/// Per-run controls, usually taken from the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path of the merged corpus
    pub corpus_path: PathBuf,

    /// Requested article total
    pub articles: Quota,

    pub categories: CategorySelection,

    /// Pause between requests of one worker
    pub delay: bool,

    /// Spread `articles` evenly across categories
    pub spread: bool,

    /// Delete category sinks after merging
    pub cleanup: bool,

    pub cap_policy: CapPolicy,

    /// Mine extra topic categories when crawling all categories
    pub discover_topics: bool,
}

impl RunOptions {
    /// Default options for a configuration: everything, unbounded, polite
    pub fn from_config(config: &Config) -> Self {
        Self {
            corpus_path: PathBuf::from(&config.output.corpus_path),
            articles: Quota::Unbounded,
            categories: CategorySelection::All,
            delay: true,
            spread: false,
            cleanup: false,
            cap_policy: CapPolicy::PerCategory,
            discover_topics: config.site.discover_topics,
        }
    }
}

/// Everything one category worker needs, cloned into its task
#[derive(Clone)]
struct CategoryWorker {
    crawler: CategoryCrawler,
    extractor: ArticleExtractor,
    cutoff: NaiveDate,
    delay: bool,
    politeness_delay: Duration,
    category_retries: u32,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    options: RunOptions,
    fetcher: PageFetcher,
    parser: Arc<dyn PageParser>,
    validator: Arc<dyn UrlValidator>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Parser and validator are built here, so selector and locale problems
    /// surface before any request is made.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `options` - Per-run controls
    pub fn new(config: Config, options: RunOptions) -> Result<Self, CrawlError> {
        let parser = build_parser(&config)?;
        let validator = build_validator(&config)?;
        let mut fetcher = PageFetcher::from_config(&config.crawler, &config.user_agent)?;
        if !options.delay {
            fetcher = fetcher.with_retry_delay(Duration::ZERO);
        }
        tracing::debug!("Timed out requests retry after {:?}", fetcher.retry_delay());

        Ok(Self {
            config: Arc::new(config),
            options,
            fetcher,
            parser,
            validator,
        })
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Returns the configured categories selected for this run
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<CategorySpec>)` - Selected categories in configuration order
    /// * `Err(ConfigError)` - A requested name is not configured
    pub fn selected_categories(&self) -> Result<Vec<CategorySpec>, ConfigError> {
        match &self.options.categories {
            CategorySelection::All => Ok(self
                .config
                .categories
                .iter()
                .map(|c| CategorySpec::new(c.name.clone(), c.url.clone()))
                .collect()),
            CategorySelection::Named(names) => {
                let mut selected: Vec<CategorySpec> = Vec::new();
                for name in names {
                    let entry = self
                        .config
                        .find_category(name)
                        .ok_or_else(|| ConfigError::UnknownCategory(name.clone()))?;
                    if !selected.iter().any(|c| c.name == entry.name) {
                        selected.push(CategorySpec::new(entry.name.clone(), entry.url.clone()));
                    }
                }
                Ok(selected)
            }
        }
    }

    /// Resolves the full category set, running topic discovery if enabled
    ///
    /// Discovered topics are appended after the configured categories. If the
    /// homepage cannot be fetched the configured categories are used alone.
    pub async fn resolve_categories(&self) -> Result<Vec<CategorySpec>, CrawlError> {
        let mut categories = self.selected_categories()?;

        if self.options.categories != CategorySelection::All || !self.options.discover_topics {
            return Ok(categories);
        }

        let known_urls: HashSet<String> =
            categories.iter().map(|c| c.entry_url.clone()).collect();
        let known_names: HashSet<String> = categories.iter().map(|c| c.name.clone()).collect();
        let discoverer = TopicDiscoverer::new(
            self.fetcher.clone(),
            self.parser.clone(),
            self.validator.clone(),
            self.politeness_delay(),
        );

        let discovery = match discoverer
            .discover_topics(&self.config.site.homepage, &known_urls, &known_names)
            .await
        {
            Ok(discovery) => discovery,
            Err(e) => {
                tracing::warn!(
                    "Topic discovery failed, crawling configured categories only: {}",
                    e
                );
                return Ok(categories);
            }
        };

        let mut sink_keys: HashSet<String> = known_names
            .iter()
            .map(|name| category_sink_key(name))
            .collect();
        for (name, url) in discovery.topics {
            if sink_keys.insert(category_sink_key(&name)) {
                categories.push(CategorySpec::new(name, url));
            }
        }

        Ok(categories)
    }

    /// Pairs every category with its quota
    pub fn plan(&self, categories: &[CategorySpec]) -> Vec<(CategorySpec, Quota)> {
        allocate_quotas(
            categories,
            self.options.articles,
            self.options.spread,
            &self.config.spread,
        )
    }

    /// Runs the whole pipeline and returns its summary
    ///
    /// Category failures are reported in the summary rather than aborting
    /// the run. Only configuration problems and a failed merge are returned
    /// as errors.
    pub async fn run(&self) -> Result<RunSummary, CrawlError> {
        let started_at = Utc::now();

        let categories = self.resolve_categories().await?;
        let plan = self.plan(&categories);
        tracing::info!("Crawling {} categories", plan.len());

        let reports = self.run_workers(plan).await?;

        let sinks: Vec<PathBuf> = reports
            .iter()
            .filter_map(|r| r.sink_path.clone())
            .collect();
        let limit = merge_limit(
            self.options.articles,
            self.options.spread,
            self.options.cap_policy,
        );
        let merge = merge_corpora(&sinks, &self.options.corpus_path, limit)?;

        let sinks_removed = if self.options.cleanup {
            remove_sinks(&sinks)?
        } else {
            0
        };

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            categories: reports,
            corpus_path: self.options.corpus_path.clone(),
            merged_rows: merge.rows_written,
            duplicates_dropped: merge.duplicates_dropped,
            sinks_removed,
        };

        tracing::info!(
            "Scraping done. {} articles written across {} categories, {} in merged corpus",
            summary.total_written(),
            summary.categories.len(),
            summary.merged_rows
        );

        Ok(summary)
    }

    /// Runs every category on the bounded pool and waits for all of them
    async fn run_workers(
        &self,
        plan: Vec<(CategorySpec, Quota)>,
    ) -> Result<Vec<CategoryReport>, CrawlError> {
        let semaphore = Arc::new(Semaphore::new(self.worker_limit()));
        let worker = CategoryWorker {
            crawler: CategoryCrawler::new(
                self.fetcher.clone(),
                self.parser.clone(),
                self.validator.clone(),
                Duration::from_millis(self.config.crawler.politeness_delay_ms),
            ),
            extractor: ArticleExtractor::new(self.fetcher.clone(), self.parser.clone()),
            cutoff: self.config.crawler.oldest_article_date,
            delay: self.options.delay,
            politeness_delay: Duration::from_millis(self.config.crawler.politeness_delay_ms),
            category_retries: self.config.crawler.category_retries,
        };

        let mut handles = Vec::with_capacity(plan.len());
        for (category, quota) in plan {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| CrawlError::Worker {
                    category: category.name.clone(),
                    message: e.to_string(),
                })?;

            let worker = worker.clone();
            let sink_path = category_sink_path(&self.options.corpus_path, &category.name);
            let name = category.name.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                worker.run(category, quota, sink_path).await
            });
            handles.push((name, quota, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (name, quota, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!("Worker for {} did not complete: {}", name, e);
                    let mut report = CategoryReport::new(name, quota);
                    report.error = Some(e.to_string());
                    reports.push(report);
                }
            }
        }

        Ok(reports)
    }

    fn worker_limit(&self) -> usize {
        match self.config.crawler.max_concurrent_categories {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }

    fn politeness_delay(&self) -> Option<Duration> {
        let delay = Duration::from_millis(self.config.crawler.politeness_delay_ms);
        (self.options.delay && !delay.is_zero()).then_some(delay)
    }
}

impl CategoryWorker {
    /// Crawls, extracts and writes one category, never failing the run
    async fn run(self, category: CategorySpec, quota: Quota, sink_path: PathBuf) -> CategoryReport {
        let mut report = CategoryReport::new(category.name.clone(), quota);

        if let Err(e) = self.crawl(&category, quota, sink_path, &mut report).await {
            tracing::error!("Category {} failed: {}", category.name, e);
            report.error = Some(e.to_string());
            discard_partial_sink(&mut report);
        }

        report
    }

    async fn crawl(
        &self,
        category: &CategorySpec,
        quota: Quota,
        sink_path: PathBuf,
        report: &mut CategoryReport,
    ) -> Result<(), CrawlError> {
        tracing::info!("Getting stories for {}...", category.name);

        let state = self.discover(category, quota, report).await?;
        report.pages_fetched = state.pages_fetched();
        report.urls_discovered = state.len();
        tracing::info!("{} stories found for {} category", state.len(), category.name);

        let mut writer = CorpusWriter::create(&sink_path, quota)?;
        report.sink_path = Some(sink_path);
        tracing::info!("Writing articles for {} category...", category.name);

        for (index, url) in state.urls().iter().enumerate() {
            if writer.is_full() {
                tracing::info!(
                    "Requested number of articles {} reached for {}",
                    quota,
                    category.name
                );
                break;
            }

            if index > 0 && self.delay && !self.politeness_delay.is_zero() {
                tokio::time::sleep(self.politeness_delay).await;
            }

            match self
                .extractor
                .extract_outcome(url, &category.name, self.cutoff)
                .await
            {
                Ok(Extraction::Accepted(record)) => {
                    if writer.write(&record)? {
                        tracing::info!(
                            "Successfully wrote story number {} for {}",
                            writer.accepted(),
                            category.name
                        );
                    }
                }
                Ok(Extraction::TooOld) => report.skipped_too_old += 1,
                Ok(Extraction::NoContent) => report.skipped_no_content += 1,
                Err(e) => {
                    tracing::warn!("Failed to extract {}: {}", url, e);
                    report.failed_articles += 1;
                }
            }
        }

        report.articles_written = writer.finish()?;
        tracing::info!(
            "Scraping done for {}. A total of {} articles were scraped!",
            category.name,
            report.articles_written
        );

        Ok(())
    }

    /// Discovers URLs, resuming after failed pages up to the retry limit
    ///
    /// When retries run out, URLs found before the failure are kept and the
    /// failure is recorded as a partial discovery. A category whose very
    /// first page cannot be fetched fails outright.
    async fn discover(
        &self,
        category: &CategorySpec,
        quota: Quota,
        report: &mut CategoryReport,
    ) -> Result<CategoryState, CrawlError> {
        let mut state = CategoryState::new(category.clone());
        let mut attempts = 0;

        loop {
            match self.crawler.resume(&mut state, quota, self.delay).await {
                Ok(()) => return Ok(state),
                Err(e) if attempts < self.category_retries => {
                    attempts += 1;
                    tracing::warn!(
                        "Discovery of {} failed at page {} ({}), retry {}/{}",
                        category.name,
                        state.next_page(),
                        e,
                        attempts,
                        self.category_retries
                    );
                    if self.delay && !self.politeness_delay.is_zero() {
                        tokio::time::sleep(self.politeness_delay).await;
                    }
                }
                Err(e) if state.total_pages().is_some() => {
                    tracing::warn!(
                        "Discovery of {} stopped at page {}: {}; keeping {} urls",
                        category.name,
                        state.next_page(),
                        e,
                        state.len()
                    );
                    report.discovery_error = Some(e.to_string());
                    return Ok(state);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Deletes the sink of a failed category so neither merge nor cleanup sees it
fn discard_partial_sink(report: &mut CategoryReport) {
    if let Some(sink_path) = report.sink_path.take() {
        if let Err(e) = remove_sinks(std::slice::from_ref(&sink_path)) {
            tracing::warn!(
                "Could not remove partial sink {}: {}",
                sink_path.display(),
                e
            );
        }
    }
}
