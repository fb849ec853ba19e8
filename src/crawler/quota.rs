//! Per-category article quota allocation

use crate::config::SpreadConfig;
use crate::state::{CategorySpec, Quota};

/// How a total article count caps the corpus when it is not spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapPolicy {
    /// Every category independently stops at the requested total
    #[default]
    PerCategory,

    /// Additionally truncate the merged corpus to the requested total
    Global,
}

/// Computes the quota of every selected category
///
/// Without spreading (or with an unbounded total) every category receives
/// the requested total. With spreading, the fixed category (a single-page
/// feed of known size) is reserved its full size and the remainder is split
/// evenly across the other categories; integer division remainders are
/// dropped.
///
/// # Examples
///
/// ```
/// use corpus_crawler::config::SpreadConfig;
/// use corpus_crawler::crawler::allocate_quotas;
/// use corpus_crawler::state::{CategorySpec, Quota};
///
/// let categories: Vec<CategorySpec> = ["WORLD", "SPORT", "AFRICA", "ENTERTAINMENT", "MOST_POPULAR"]
///     .iter()
///     .map(|name| CategorySpec::new(*name, "https://www.bbc.com/pidgin"))
///     .collect();
///
/// let plan = allocate_quotas(&categories, Quota::Limit(100), true, &SpreadConfig::default());
/// assert_eq!(plan[0].1, Quota::Limit(22));
/// assert_eq!(plan[4].1, Quota::Limit(10));
/// ```
pub fn allocate_quotas(
    categories: &[CategorySpec],
    requested: Quota,
    spread: bool,
    spread_config: &SpreadConfig,
) -> Vec<(CategorySpec, Quota)> {
    let total = match (requested, spread) {
        (Quota::Limit(total), true) if !categories.is_empty() => total,
        _ => {
            return categories
                .iter()
                .map(|c| (c.clone(), requested))
                .collect()
        }
    };

    let is_fixed = |c: &CategorySpec| c.name.eq_ignore_ascii_case(&spread_config.fixed_category);
    let has_fixed = categories.iter().any(is_fixed);

    let per_category = if has_fixed {
        let others = categories.len() - 1;
        if others == 0 {
            0
        } else {
            total.saturating_sub(spread_config.fixed_size) / others
        }
    } else {
        total / categories.len()
    };

    tracing::info!("Will collect at least {} stories per category", per_category);

    categories
        .iter()
        .map(|c| {
            let quota = if is_fixed(c) {
                Quota::Limit(spread_config.fixed_size)
            } else {
                Quota::Limit(per_category)
            };
            (c.clone(), quota)
        })
        .collect()
}

/// Returns the row limit applied to the merged corpus, if any
pub fn merge_limit(requested: Quota, spread: bool, policy: CapPolicy) -> Option<usize> {
    match policy {
        CapPolicy::Global if !spread => requested.limit(),
        _ => None,
    }
}
