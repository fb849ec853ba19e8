use crate::config::types::{
    CategoryEntry, Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig,
    UserAgentConfig, ValidatorConfig,
};
use crate::output::category_sink_key;
use crate::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_site_config(&config.site)?;
    validate_selector_config(&config.selectors)?;
    validate_validator_config(&config.validator)?;
    validate_categories(&config.categories)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_concurrent_categories > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_categories must be between 0 and 256, got {}",
            config.max_concurrent_categories
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if Path::new(&config.corpus_path).file_name().is_none() {
        return Err(ConfigError::Validation(format!(
            "corpus_path must name a file, got '{}'",
            config.corpus_path
        )));
    }

    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("homepage", &config.homepage)?;
    validate_http_url("base_url", &config.base_url)?;
    Ok(())
}

/// Validates that every selector the parser needs is present
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("pagination_list_class", &config.pagination_list_class),
        ("story_div_class", &config.story_div_class),
        ("article_date_class", &config.article_date_class),
        ("topic_list_class", &config.topic_list_class),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates article URL rules
fn validate_validator_config(config: &ValidatorConfig) -> Result<(), ConfigError> {
    if config.path_prefixes.is_empty() {
        return Err(ConfigError::Validation(
            "validator must have at least one path prefix".to_string(),
        ));
    }

    for prefix in config
        .path_prefixes
        .iter()
        .chain(&config.deny_prefixes)
        .chain(&config.always_valid_prefixes)
    {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Path prefix '{}' must start with '/'",
                prefix
            )));
        }
    }

    Ok(())
}

/// Validates category entries
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for entry in categories {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Category name cannot be empty".to_string(),
            ));
        }

        if let Some(previous) = seen.insert(category_sink_key(&entry.name), &entry.name) {
            return Err(ConfigError::Validation(format!(
                "Categories '{}' and '{}' would write the same output file",
                previous, entry.name
            )));
        }

        validate_http_url(&format!("category '{}'", entry.name), &entry.url)?;
    }

    Ok(())
}

/// Validates an absolute HTTP(S) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} URL '{}': {}", field, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "{} URL '{}' must use HTTP or HTTPS",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} URL '{}' has no host",
            field, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
