use crate::ConfigError;
use std::fmt;

/// Maximum number of accepted articles for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    /// Crawl until pages or URLs run out
    Unbounded,
    /// Stop once this many articles have been accepted
    Limit(usize),
}

impl Quota {
    /// Converts a user supplied article count (`-1` = unbounded)
    ///
    /// # Returns
    ///
    /// * `Ok(Quota)` - `-1` or a positive count
    /// * `Err(ConfigError)` - zero or any other negative value
    pub fn from_count(count: i64) -> Result<Self, ConfigError> {
        match count {
            -1 => Ok(Self::Unbounded),
            n if n > 0 => Ok(Self::Limit(n as usize)),
            n => Err(ConfigError::InvalidArticleCount(n)),
        }
    }

    /// Returns true once `count` items satisfy this quota
    pub fn is_satisfied(&self, count: usize) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Limit(limit) => count >= *limit,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Limit(limit) => Some(*limit),
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Limit(limit) => write!(f, "{}", limit),
        }
    }
}
