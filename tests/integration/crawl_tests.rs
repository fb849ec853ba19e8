//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing, article and homepage markup
//! and run discovery, extraction and full coordinated crawls against it.

use chrono::NaiveDate;
use corpus_crawler::config::{parse_config, Config};
use corpus_crawler::crawler::{
    build_parser, ArticleExtractor, CapPolicy, CategoryCrawler, CategorySelection, Coordinator,
    Extraction, PageFetcher, RunOptions, TopicDiscoverer,
};
use corpus_crawler::output::{read_sink, CategoryReport, CorpusRow, RunSummary};
use corpus_crawler::url::build_validator;
use corpus_crawler::{ArticleUrl, CategorySpec, ConfigError, CrawlError, Quota};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, corpus_path: &Path) -> Config {
    let toml = format!(
        r#"
[crawler]
politeness-delay-ms = 0
request-timeout-secs = 5
timeout-retries = 0
oldest-article-date = "2023-05-01"

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
corpus-path = "{corpus}"

[site]
homepage = "{base}/pidgin"
base-url = "{base}"

[selectors]
pagination-list-class = "bbc-f8df6t e19602dz4"
article-count-span-class = "bbc-count"
headline-classes = ["bbc-headline"]
alt-headline-classes = ["bbc-strong-headline"]
story-div-class = "bbc-story"
article-date-class = "bbc-date"
topic-list-class = "bbc-topic"

[validator]
path-prefixes = ["/pidgin/"]
article-stubs = ["tori", "world", "sport", "media"]
deny-prefixes = ["/pidgin/topics", "/pidgin/media-", "/pidgin/bbc_pidgin_radio"]

[[category]]
name = "WORLD"
url = "{base}/pidgin/world"

[[category]]
name = "SPORT"
url = "{base}/pidgin/sport"

[[category]]
name = "MOST_POPULAR"
url = "{base}/pidgin/popular/read"
"#,
        base = base_url,
        corpus = corpus_path.display()
    );

    parse_config(&toml).expect("Test config should be valid")
}

/// Run options for tests: no delay, everything else from the config
fn test_options(config: &Config) -> RunOptions {
    let mut options = RunOptions::from_config(config);
    options.delay = false;
    options
}

fn listing_page(hrefs: &[&str], total_pages: Option<u32>) -> String {
    let links: String = hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{}">Story</a></li>"#, href))
        .collect();
    let pagination = match total_pages {
        Some(total) => {
            let items: String = (1..=total).map(|n| format!("<li>{}</li>", n)).collect();
            format!(r#"<ul class="bbc-f8df6t e19602dz4">{}</ul>"#, items)
        }
        None => String::new(),
    };

    format!(
        r#"<html><body>
        <nav><a href="/pidgin">Home</a><a href="/pidgin/world">World</a><a href="/pidgin/topics/c1">Topic</a></nav>
        <ul>{}</ul>
        {}
        </body></html>"#,
        links, pagination
    )
}

fn article_page(
    headline: &str,
    published: &str,
    paragraphs: &[&str],
    topics: &[(&str, &str)],
) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    let topics: String = topics
        .iter()
        .map(|(text, href)| {
            format!(r#"<li class="bbc-topic"><a href="{}">{}</a></li>"#, href, text)
        })
        .collect();

    format!(
        r#"<html><body>
        <time class="bbc-date" datetime="{}T08:30:00.000Z">published</time>
        <h1 class="bbc-headline">{}</h1>
        <div class="bbc-story">{}<div><p>nested, not story text</p></div></div>
        <ul>{}</ul>
        </body></html>"#,
        published, headline, body, topics
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Mounts an article responder for every world/sport story URL
async fn mount_articles(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/pidgin/(world|sport)-\d+$"))
        .respond_with(html(article_page(
            "Wetin happen",
            "2023-06-01",
            &["First paragraph.", "Second paragraph."],
            &[],
        )))
        .mount(mock_server)
        .await;
}

fn category_crawler(config: &Config) -> CategoryCrawler {
    CategoryCrawler::new(
        PageFetcher::from_config(&config.crawler, &config.user_agent).unwrap(),
        build_parser(config).unwrap(),
        build_validator(config).unwrap(),
        Duration::ZERO,
    )
}

fn report<'a>(summary: &'a RunSummary, category: &str) -> &'a CategoryReport {
    summary
        .categories
        .iter()
        .find(|r| r.category == category)
        .expect("category should be reported")
}

fn row_urls(rows: &[CorpusRow]) -> HashSet<String> {
    rows.iter().map(|r| r.url.clone()).collect()
}

#[tokio::test]
async fn test_world_category_three_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Page 2 and 3 are mounted first so the query matchers take precedence
    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(
            &["/pidgin/world-21", "/pidgin/world-22", "/pidgin/world-23", "/pidgin/world-11"],
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .and(query_param("page", "3"))
        .respond_with(html(listing_page(&[], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .respond_with(html(listing_page(
            &[
                "/pidgin/world-11",
                "/pidgin/world-12",
                "/pidgin/world-13",
                "/pidgin/tori-14",
                "/pidgin/sport-15",
                "/pidgin/media-16",
                "/pidgin/live/world-17",
            ],
            Some(3),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&base_url, &dir.path().join("corpus.tsv"));
    let category = CategorySpec::new("WORLD", format!("{}/pidgin/world", base_url));

    let state = category_crawler(&config)
        .discover(&category, Quota::Unbounded, false)
        .await
        .expect("Discovery should succeed");

    assert_eq!(state.len(), 8);
    assert_eq!(state.pages_fetched(), 3);
    assert_eq!(state.total_pages(), Some(3));
    assert!(state.is_exhausted());
    assert!(state
        .urls()
        .iter()
        .all(|u| u.as_str().starts_with(&format!("{}/pidgin/", base_url))));
    assert!(!state
        .urls()
        .iter()
        .any(|u| u.as_str().ends_with("/pidgin/media-16") || u.as_str().contains("/live/")));

    // Mock expectations are verified when the server is dropped
}

#[tokio::test]
async fn test_discovery_stops_when_quota_satisfied() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(&["/pidgin/world-21"], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .respond_with(html(listing_page(
            &[
                "/pidgin/world-1",
                "/pidgin/world-2",
                "/pidgin/world-3",
                "/pidgin/world-4",
                "/pidgin/world-5",
            ],
            Some(3),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&base_url, &dir.path().join("corpus.tsv"));
    let category = CategorySpec::new("WORLD", format!("{}/pidgin/world", base_url));

    let state = category_crawler(&config)
        .discover(&category, Quota::Limit(4), false)
        .await
        .unwrap();

    assert_eq!(state.len(), 5);
    assert_eq!(state.pages_fetched(), 1);
    assert!(!state.is_exhausted());
}

#[tokio::test]
async fn test_discovery_failure_keeps_progress_for_resume() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(&["/pidgin/world-21"], None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .respond_with(html(listing_page(&["/pidgin/world-1"], Some(2))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&base_url, &dir.path().join("corpus.tsv"));
    let crawler = category_crawler(&config);
    let mut state = corpus_crawler::CategoryState::new(CategorySpec::new(
        "WORLD",
        format!("{}/pidgin/world", base_url),
    ));

    let result = crawler.resume(&mut state, Quota::Unbounded, false).await;
    assert!(matches!(result, Err(CrawlError::HttpStatus { status: 503, .. })));
    assert_eq!(state.len(), 1);
    assert_eq!(state.next_page(), 2);

    crawler
        .resume(&mut state, Quota::Unbounded, false)
        .await
        .expect("Resume should fetch the failed page only");
    assert_eq!(state.len(), 2);
    assert!(state.is_exhausted());
}

#[tokio::test]
async fn test_article_on_cutoff_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/pidgin/world-1"))
        .respond_with(html(article_page("On the day", "2023-05-01", &["Old news."], &[])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-2"))
        .respond_with(html(article_page(
            "Day after",
            "2023-05-02",
            &["  First paragraph. ", "Second paragraph."],
            &[],
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-3"))
        .respond_with(html(article_page("Empty", "2023-06-01", &[], &[])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&base_url, &dir.path().join("corpus.tsv"));
    let validator = build_validator(&config).unwrap();
    let extractor = ArticleExtractor::new(
        PageFetcher::from_config(&config.crawler, &config.user_agent).unwrap(),
        build_parser(&config).unwrap(),
    );
    let cutoff = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
    let url = |stub: &str| -> ArticleUrl {
        validator
            .canonicalize(&format!("/pidgin/{}", stub))
            .expect("stub should be valid")
    };

    let on_cutoff = extractor.extract(&url("world-1"), "WORLD", cutoff).await.unwrap();
    assert!(on_cutoff.is_none());
    assert!(matches!(
        extractor.extract_outcome(&url("world-1"), "WORLD", cutoff).await.unwrap(),
        Extraction::TooOld
    ));

    let record = extractor
        .extract(&url("world-2"), "WORLD", cutoff)
        .await
        .unwrap()
        .expect("article after the cutoff should be extracted");
    assert_eq!(record.headline.as_deref(), Some("Day after"));
    assert_eq!(record.body.as_deref(), Some("First paragraph.  Second paragraph."));
    assert_eq!(record.category, "WORLD");
    assert_eq!(record.url.as_str(), format!("{}/pidgin/world-2", base_url));
    assert_eq!(record.published_date, NaiveDate::from_ymd_opt(2023, 5, 2));

    assert!(matches!(
        extractor.extract_outcome(&url("world-3"), "WORLD", cutoff).await.unwrap(),
        Extraction::NoContent
    ));

    let missing = extractor.extract(&url("world-4"), "WORLD", cutoff).await;
    assert!(matches!(missing, Err(CrawlError::HttpStatus { status: 404, .. })));
}

#[tokio::test]
async fn test_topic_discovery_continues_and_is_idempotent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/pidgin"))
        .respond_with(html(listing_page(&["/pidgin/world-1", "/pidgin/world-2"], None)))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-1"))
        .respond_with(html(article_page(
            "Topics",
            "2023-06-01",
            &["Body."],
            &[
                ("Naija  Politics", "/pidgin/topics/c1"),
                ("World", "/pidgin/world"),
                ("naija politics", "/pidgin/topics/c2"),
                ("Film/TV", "/pidgin/topics/c3"),
                ("Covid (19)", "/pidgin/topics/c4"),
                ("covid 19", "/pidgin/topics/c5"),
                ("Sport", "/pidgin/topics/c6"),
            ],
        )))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&base_url, &dir.path().join("corpus.tsv"));
    let discoverer = TopicDiscoverer::new(
        PageFetcher::from_config(&config.crawler, &config.user_agent).unwrap(),
        build_parser(&config).unwrap(),
        build_validator(&config).unwrap(),
        None,
    );

    let mut known_urls: HashSet<String> =
        config.categories.iter().map(|c| c.url.clone()).collect();
    let mut known_names: HashSet<String> =
        config.categories.iter().map(|c| c.name.clone()).collect();
    let homepage = format!("{}/pidgin", base_url);

    let first = discoverer
        .discover_topics(&homepage, &known_urls, &known_names)
        .await
        .unwrap();
    assert_eq!(first.topics.len(), 3);
    assert_eq!(
        first.topics.get("NAIJA_POLITICS"),
        Some(&format!("{}/pidgin/topics/c1", base_url))
    );
    assert_eq!(
        first.topics.get("FILM_TV"),
        Some(&format!("{}/pidgin/topics/c3", base_url))
    );
    // "Covid (19)" and "covid 19" would share a sink; the first one wins
    assert_eq!(
        first.topics.get("COVID_(19)"),
        Some(&format!("{}/pidgin/topics/c4", base_url))
    );
    assert!(!first.topics.contains_key("COVID_19"));
    assert!(!first.topics.contains_key("SPORT"));
    assert_eq!(first.failures.len(), 1);
    assert!(first.failures[0].0.ends_with("/pidgin/world-2"));

    // Same-named links skipped in the first pass must stay skipped
    known_urls.extend(first.topics.values().cloned());
    known_names.extend(first.topics.keys().cloned());
    let second = discoverer
        .discover_topics(&homepage, &known_urls, &known_names)
        .await
        .unwrap();
    assert!(second.topics.is_empty(), "{:?}", second.topics);
}

/// Mounts single-page listings for all three configured categories
///
/// `world-100` is listed by both WORLD and SPORT.
async fn mount_category_listings(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .respond_with(html(listing_page(
            &["/pidgin/world-1", "/pidgin/world-2", "/pidgin/world-100"],
            None,
        )))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/sport"))
        .respond_with(html(listing_page(&["/pidgin/sport-1", "/pidgin/world-100"], None)))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/popular/read"))
        .respond_with(html(listing_page(&["/pidgin/world-3"], None)))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_merges_with_later_category_winning() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_category_listings(&mock_server).await;
    mount_articles(&mock_server).await;

    let dir = tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.tsv");
    let config = create_test_config(&base_url, &corpus_path);
    let options = test_options(&config);

    let coordinator = Coordinator::new(config, options).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl should succeed");

    assert_eq!(summary.categories.len(), 3);
    assert!(summary.failed_categories().is_empty());
    assert_eq!(report(&summary, "WORLD").articles_written, 3);
    assert_eq!(report(&summary, "SPORT").articles_written, 2);
    assert_eq!(report(&summary, "MOST_POPULAR").articles_written, 1);
    assert_eq!(summary.total_written(), 6);
    assert_eq!(summary.duplicates_dropped, 1);
    assert_eq!(summary.merged_rows, 5);

    let rows = read_sink(&corpus_path).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(row_urls(&rows).len(), 5);

    let shared = rows
        .iter()
        .find(|r| r.url.ends_with("/pidgin/world-100"))
        .expect("shared article should be merged");
    assert_eq!(shared.category, "SPORT");
    assert_eq!(shared.headline, "Wetin happen");
    assert_eq!(shared.text, "First paragraph. Second paragraph.");

    // Category sinks are kept without --cleanup
    assert!(dir.path().join("WORLD_corpus.tsv").exists());
    assert!(dir.path().join("MOST_POPULAR_corpus.tsv").exists());
}

#[tokio::test]
async fn test_per_category_quota_caps_each_sink() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_category_listings(&mock_server).await;
    mount_articles(&mock_server).await;

    let dir = tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.tsv");
    let config = create_test_config(&base_url, &corpus_path);
    let mut options = test_options(&config);
    options.articles = Quota::Limit(2);

    let summary = Coordinator::new(config, options).unwrap().run().await.unwrap();

    for category in ["WORLD", "SPORT", "MOST_POPULAR"] {
        let sink = dir.path().join(format!("{}_corpus.tsv", category));
        let rows = read_sink(&sink).unwrap();
        assert!(rows.len() <= 2, "{} wrote {} rows", category, rows.len());
        assert_eq!(rows.len(), report(&summary, category).articles_written);
    }
    assert_eq!(report(&summary, "WORLD").articles_written, 2);
    assert!(read_sink(&corpus_path).unwrap().len() > 2);
}

#[tokio::test]
async fn test_global_cap_truncates_merged_corpus() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_category_listings(&mock_server).await;
    mount_articles(&mock_server).await;

    let dir = tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.tsv");
    let config = create_test_config(&base_url, &corpus_path);
    let mut options = test_options(&config);
    options.articles = Quota::Limit(2);
    options.cap_policy = CapPolicy::Global;

    let summary = Coordinator::new(config, options).unwrap().run().await.unwrap();

    assert_eq!(summary.merged_rows, 2);
    assert_eq!(read_sink(&corpus_path).unwrap().len(), 2);
}

#[tokio::test]
async fn test_spread_and_cleanup() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_category_listings(&mock_server).await;
    mount_articles(&mock_server).await;

    let dir = tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.tsv");
    let mut config = create_test_config(&base_url, &corpus_path);
    config.spread.fixed_size = 1;
    let mut options = test_options(&config);
    options.articles = Quota::Limit(5);
    options.spread = true;
    options.cleanup = true;
    options.categories = CategorySelection::parse("world,most_popular");

    let summary = Coordinator::new(config, options).unwrap().run().await.unwrap();

    assert_eq!(summary.categories.len(), 2);
    assert_eq!(report(&summary, "WORLD").quota, Quota::Limit(4));
    assert_eq!(report(&summary, "WORLD").articles_written, 3);
    assert_eq!(report(&summary, "MOST_POPULAR").quota, Quota::Limit(1));
    assert_eq!(summary.sinks_removed, 2);

    assert!(corpus_path.exists());
    assert!(!dir.path().join("WORLD_corpus.tsv").exists());
    assert!(!dir.path().join("MOST_POPULAR_corpus.tsv").exists());
    assert_eq!(read_sink(&corpus_path).unwrap().len(), 4);
}

#[tokio::test]
async fn test_failed_categories_do_not_block_merge() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // WORLD fails on page 2 of 2, SPORT fails outright, MOST_POPULAR succeeds
    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world"))
        .respond_with(html(listing_page(&["/pidgin/world-1"], Some(2))))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/sport"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/popular/read"))
        .respond_with(html(listing_page(&["/pidgin/world-3"], None)))
        .mount(&mock_server)
        .await;

    mount_articles(&mock_server).await;

    let dir = tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.tsv");
    let mut config = create_test_config(&base_url, &corpus_path);
    config.crawler.category_retries = 1;
    let options = test_options(&config);

    let summary = Coordinator::new(config, options).unwrap().run().await.unwrap();

    let world = report(&summary, "WORLD");
    assert!(world.succeeded());
    assert!(world.is_partial());
    assert_eq!(world.urls_discovered, 1);
    assert_eq!(world.articles_written, 1);

    let sport = report(&summary, "SPORT");
    assert!(!sport.succeeded());
    assert!(sport.sink_path.is_none());
    assert_eq!(summary.failed_categories(), vec!["SPORT"]);

    let urls = row_urls(&read_sink(&corpus_path).unwrap());
    assert_eq!(
        urls,
        HashSet::from([
            format!("{}/pidgin/world-1", base_url),
            format!("{}/pidgin/world-3", base_url),
        ])
    );
}

#[tokio::test]
async fn test_failed_articles_are_counted_and_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/pidgin/popular/read"))
        .respond_with(html(listing_page(
            &["/pidgin/world-1", "/pidgin/world-2", "/pidgin/world-3"],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-2"))
        .respond_with(html(article_page("Old", "2020-01-01", &["Old body."], &[])))
        .mount(&mock_server)
        .await;

    mount_articles(&mock_server).await;

    let dir = tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.tsv");
    let config = create_test_config(&base_url, &corpus_path);
    let mut options = test_options(&config);
    options.categories = CategorySelection::parse("MOST_POPULAR");

    let summary = Coordinator::new(config, options).unwrap().run().await.unwrap();

    let popular = report(&summary, "MOST_POPULAR");
    assert_eq!(popular.urls_discovered, 3);
    assert_eq!(popular.failed_articles, 1);
    assert_eq!(popular.skipped_too_old, 1);
    assert_eq!(popular.articles_written, 1);
    assert_eq!(summary.merged_rows, 1);
}

#[tokio::test]
async fn test_topic_discovery_adds_categories() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_category_listings(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/pidgin"))
        .respond_with(html(listing_page(&["/pidgin/world-50"], None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pidgin/world-50"))
        .respond_with(html(article_page(
            "Topical",
            "2023-06-01",
            &["Body."],
            &[
                ("Naija Politics", "/pidgin/topics/c1"),
                ("Sport", "/pidgin/sport"),
                ("Most Popular", "/pidgin/topics/c9"),
            ],
        )))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&base_url, &dir.path().join("corpus.tsv"));
    let mut options = test_options(&config);
    options.discover_topics = true;

    let coordinator = Coordinator::new(config.clone(), options.clone()).unwrap();
    let categories = coordinator.resolve_categories().await.unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["WORLD", "SPORT", "MOST_POPULAR", "NAIJA_POLITICS"]);

    // Topics are only added when crawling every category
    options.categories = CategorySelection::parse("world");
    let coordinator = Coordinator::new(config, options).unwrap();
    assert_eq!(coordinator.resolve_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_category_fails_before_any_request() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let dir = tempdir().unwrap();
    let config = create_test_config(&base_url, &dir.path().join("corpus.tsv"));
    let mut options = test_options(&config);
    options.categories = CategorySelection::parse("world,atlantis");

    let result = Coordinator::new(config, options).unwrap().run().await;
    assert!(matches!(
        result,
        Err(CrawlError::Config(ConfigError::UnknownCategory(name))) if name == "atlantis"
    ));

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}
