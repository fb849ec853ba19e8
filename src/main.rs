//! Corpus-Crawler main entry point
//!
//! This is the command-line interface for the multi-category news corpus crawler.

use anyhow::Context;
use clap::Parser;
use corpus_crawler::config::{load_config_with_hash, Config};
use corpus_crawler::crawler::{crawl, CapPolicy, CategorySelection, Coordinator, RunOptions};
use corpus_crawler::output::print_summary;
use corpus_crawler::Quota;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Corpus-Crawler: a polite multi-category news corpus builder
///
/// Corpus-Crawler walks the paginated category listings of a news site,
/// extracts the text of every article it finds, and merges the results into
/// one deduplicated tab-separated corpus.
#[derive(Parser, Debug)]
#[command(name = "corpus-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite multi-category news corpus crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Path of the merged corpus (overrides output.corpus-path)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Total number of articles to collect (-1 for every article)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    articles: i64,

    /// Comma-separated category names, or "all"
    #[arg(long, default_value = "all")]
    categories: String,

    /// Discover extra topic categories from homepage articles (with "all" only)
    #[arg(long)]
    discover_topics: bool,

    /// Disable the politeness delay between requests
    #[arg(long)]
    no_delay: bool,

    /// Spread the article count evenly across categories
    #[arg(long)]
    spread: bool,

    /// Delete per-category files after merging
    #[arg(long)]
    cleanup: bool,

    /// Truncate the merged corpus to the article count
    #[arg(long, conflicts_with = "spread")]
    global_cap: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let options = run_options(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(config, options)
    } else {
        handle_crawl(config, options).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("corpus_crawler=info,warn"),
            1 => EnvFilter::new("corpus_crawler=debug,info"),
            2 => EnvFilter::new("corpus_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Combines command-line flags with configuration defaults
fn run_options(cli: &Cli, config: &Config) -> anyhow::Result<RunOptions> {
    let mut options = RunOptions::from_config(config);

    if let Some(output) = &cli.output {
        options.corpus_path = output.clone();
    }
    options.articles = Quota::from_count(cli.articles)?;
    options.categories = CategorySelection::parse(&cli.categories);
    options.discover_topics |= cli.discover_topics;
    options.delay = !cli.no_delay;
    options.spread = cli.spread;
    options.cleanup = cli.cleanup;
    if cli.global_cap {
        options.cap_policy = CapPolicy::Global;
    }

    Ok(options)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
///
/// Topic discovery is not run, so only configured categories are listed.
fn handle_dry_run(config: Config, options: RunOptions) -> anyhow::Result<()> {
    println!("=== Corpus-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Timeout retries: {}", config.crawler.timeout_retries);
    println!("  Category retries: {}", config.crawler.category_retries);
    println!(
        "  Oldest article date: {}",
        config.crawler.oldest_article_date
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSite:");
    println!("  Homepage: {}", config.site.homepage);
    println!("  Parser: {}", config.site.parser);
    println!("  Validator: {}", config.validator.locale);

    println!("\nOutput:");
    println!("  Corpus: {}", options.corpus_path.display());
    println!("  Delay: {}", if options.delay { "on" } else { "off" });
    println!("  Cleanup: {}", options.cleanup);

    let coordinator = Coordinator::new(config, options)?;
    let categories = coordinator.selected_categories()?;
    let plan = coordinator.plan(&categories);

    println!("\nCategories ({}):", plan.len());
    for (category, quota) in &plan {
        println!("  - {} (quota {})", category.name, quota);
        println!("    * {}", category.entry_url);
    }

    println!("\n✓ Configuration is valid");
    let options = coordinator.options();
    if options.discover_topics && options.categories == CategorySelection::All {
        println!("✓ Topic discovery would add categories from the homepage");
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, options: RunOptions) -> anyhow::Result<()> {
    tracing::info!(
        "Requested articles: {}, spread: {}, delay: {}",
        options.articles,
        options.spread,
        options.delay
    );

    let summary = crawl(config, options).await.context("Crawl failed")?;
    print_summary(&summary);

    let failed = summary.failed_categories();
    if !failed.is_empty() {
        tracing::warn!("Categories without output: {}", failed.join(", "));
    }

    Ok(())
}
