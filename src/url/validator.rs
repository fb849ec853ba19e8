use crate::config::ValidatorConfig;
use crate::url::{site_path, UrlValidator};

/// Article URL rules keyed on the final path segment (the article stub)
///
/// An href is an article when, after stripping the site prefix:
/// - it does not start with a deny-listed prefix,
/// - it starts with an allowed leading path followed by exactly one
///   non-empty segment, and
/// - that segment is entirely numeric, or its first hyphen-delimited token
///   is an allowed stub and it ends in a digit.
///
/// # Examples
///
/// ```
/// use corpus_crawler::config::ValidatorConfig;
/// use corpus_crawler::url::{StubRuleValidator, UrlValidator};
///
/// let rules = ValidatorConfig {
///     locale: "stub".to_string(),
///     path_prefixes: vec!["/pidgin/".to_string()],
///     article_stubs: vec!["world".to_string()],
///     deny_prefixes: vec!["/pidgin/topics".to_string()],
///     always_valid_prefixes: vec![],
/// };
/// let validator = StubRuleValidator::new("https://www.bbc.com", &rules);
///
/// assert!(validator.is_valid("/pidgin/world-54321"));
/// assert!(validator.is_valid("/pidgin/54321"));
/// assert!(!validator.is_valid("/pidgin/topics/c123"));
/// assert!(!validator.is_valid("/pidgin/tori-54321"));
/// ```
#[derive(Debug, Clone)]
pub struct StubRuleValidator {
    base_url: String,
    path_prefixes: Vec<String>,
    article_stubs: Vec<String>,
    deny_prefixes: Vec<String>,
}

impl StubRuleValidator {
    pub fn new(base_url: &str, rules: &ValidatorConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path_prefixes: rules.path_prefixes.iter().map(|p| as_directory(p)).collect(),
            article_stubs: rules.article_stubs.clone(),
            deny_prefixes: rules.deny_prefixes.clone(),
        }
    }
}

impl UrlValidator for StubRuleValidator {
    fn is_valid(&self, href: &str) -> bool {
        let path = site_path(href, &self.base_url);
        if path.is_empty() || starts_with_any(path, &self.deny_prefixes) {
            return false;
        }

        self.path_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
            .and_then(single_segment)
            .is_some_and(|stub| is_article_stub(stub, &self.article_stubs))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Article URL rules keyed on the section an href lives under
///
/// Hrefs under an always-valid prefix (e.g. `/swahili/articles/`) are
/// articles as long as a single stub follows. Anything else must sit under an
/// allowed leading path, avoid the deny list and end in a digit.
#[derive(Debug, Clone)]
pub struct SectionRuleValidator {
    base_url: String,
    path_prefixes: Vec<String>,
    always_valid_prefixes: Vec<String>,
    deny_prefixes: Vec<String>,
}

impl SectionRuleValidator {
    pub fn new(base_url: &str, rules: &ValidatorConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path_prefixes: rules.path_prefixes.clone(),
            always_valid_prefixes: rules
                .always_valid_prefixes
                .iter()
                .map(|p| as_directory(p))
                .collect(),
            deny_prefixes: rules.deny_prefixes.clone(),
        }
    }
}

impl UrlValidator for SectionRuleValidator {
    fn is_valid(&self, href: &str) -> bool {
        let path = site_path(href, &self.base_url);
        if path.is_empty() {
            return false;
        }

        if let Some(rest) = self
            .always_valid_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
        {
            return single_segment(rest).is_some();
        }

        if starts_with_any(path, &self.deny_prefixes) {
            return false;
        }

        starts_with_any(path, &self.path_prefixes)
            && path.chars().last().is_some_and(|c| c.is_ascii_digit())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn as_directory(prefix: &str) -> String {
    if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{}/", prefix)
    }
}

fn starts_with_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| path.starts_with(p.as_str()))
}

/// Returns the only non-empty segment of `rest`, if there is exactly one
fn single_segment(rest: &str) -> Option<&str> {
    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(stub), None) => Some(stub),
        _ => None,
    }
}

fn is_article_stub(stub: &str, allowed: &[String]) -> bool {
    if stub.is_empty() {
        return false;
    }

    if stub.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    let first_token = stub.split('-').next().unwrap_or_default();
    allowed.iter().any(|a| a == first_token) && stub.chars().last().is_some_and(|c| c.is_ascii_digit())
}
