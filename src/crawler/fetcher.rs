//! HTTP fetcher implementation
//!
//! This module is the crawler's only network boundary. It handles:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests returning the page body
//! - Re-issuing timed out requests a bounded number of times
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::CrawlError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use corpus_crawler::config::UserAgentConfig;
/// use corpus_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "CorpusCrawler".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests for listing and article pages
///
/// # Failure Handling
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-2xx status | `CrawlError::HttpStatus`, not retried |
/// | Timeout | Retried up to `timeout_retries` times, then `CrawlError::Timeout` |
/// | Other transport error | `CrawlError::Http`, not retried |
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout_retries: u32,
    retry_delay: Duration,
}

impl PageFetcher {
    pub fn new(client: Client, timeout_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            timeout_retries,
            retry_delay,
        }
    }

    /// Builds a fetcher from the crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, CrawlError> {
        let client = build_http_client(
            user_agent,
            Duration::from_secs(crawler.request_timeout_secs),
        )?;
        Ok(Self::new(
            client,
            crawler.timeout_retries,
            Duration::from_millis(crawler.politeness_delay_ms),
        ))
    }

    /// Replaces the pause between timeout retries
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Fetches a page and returns its body
    pub async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Err(CrawlError::Timeout { .. }) if attempt < self.timeout_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Timeout fetching {} (retry {}/{})",
                        url,
                        attempt,
                        self.timeout_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
