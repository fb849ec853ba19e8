//! Output module for corpus sinks and run reports
//!
//! This module handles:
//! - Writing per-category tab-separated corpus sinks
//! - Merging and deduplicating category sinks into the final corpus
//! - Summarizing a crawl run

mod merge;
pub mod stats;
mod writer;

pub use merge::{dedup_keep_last, merge_corpora, read_sink, remove_sinks, MergeOutcome};
pub use stats::{print_summary, CategoryReport, RunSummary};
pub use writer::{
    category_sink_key, category_sink_path, clean_category_name, write_rows, CorpusRow,
    CorpusWriter, CORPUS_DELIMITER, CORPUS_HEADERS,
};
