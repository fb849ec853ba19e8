use crate::output::writer::{write_rows, CorpusRow, CORPUS_DELIMITER};
use crate::CrawlError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Counters describing one merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Category sinks that were read
    pub sinks_read: usize,

    /// Category sinks that were missing or unreadable
    pub sinks_skipped: usize,

    /// Rows read across all sinks
    pub rows_read: usize,

    /// Rows dropped because a later row had the same URL
    pub duplicates_dropped: usize,

    /// Rows dropped by a global row limit
    pub rows_truncated: usize,

    /// Rows in the final corpus
    pub rows_written: usize,
}

/// Combines per-category sinks into one corpus
///
/// Sinks are concatenated in the given order and deduplicated by URL; the
/// last occurrence of a URL wins and keeps its position. A missing or
/// unreadable sink, or a malformed row, is logged and skipped so a failed
/// category never blocks the others.
///
/// # Arguments
///
/// * `sinks` - Per-category sinks in concatenation order
/// * `output` - Path of the merged corpus
/// * `limit` - Optional cap on the number of merged rows
pub fn merge_corpora(
    sinks: &[PathBuf],
    output: &Path,
    limit: Option<usize>,
) -> Result<MergeOutcome, CrawlError> {
    let mut outcome = MergeOutcome::default();
    let mut rows = Vec::new();

    for sink in sinks {
        match read_sink(sink) {
            Ok(sink_rows) => {
                outcome.sinks_read += 1;
                outcome.rows_read += sink_rows.len();
                rows.extend(sink_rows);
            }
            Err(e) => {
                tracing::warn!("Skipping sink {}: {}", sink.display(), e);
                outcome.sinks_skipped += 1;
            }
        }
    }

    let mut rows = dedup_keep_last(rows);
    outcome.duplicates_dropped = outcome.rows_read - rows.len();

    if let Some(limit) = limit {
        if rows.len() > limit {
            outcome.rows_truncated = rows.len() - limit;
            rows.truncate(limit);
        }
    }

    write_rows(output, &rows)?;
    outcome.rows_written = rows.len();

    tracing::info!(
        "Merged {} rows from {} sinks into {} ({} duplicates dropped)",
        outcome.rows_written,
        outcome.sinks_read,
        output.display(),
        outcome.duplicates_dropped
    );

    Ok(outcome)
}

/// Removes rows whose URL appears again later, keeping the last occurrence
pub fn dedup_keep_last(rows: Vec<CorpusRow>) -> Vec<CorpusRow> {
    let keep: Vec<bool> = {
        let mut last_index: HashMap<&str, usize> = HashMap::new();
        for (index, row) in rows.iter().enumerate() {
            last_index.insert(row.url.as_str(), index);
        }

        rows.iter()
            .enumerate()
            .map(|(index, row)| last_index.get(row.url.as_str()) == Some(&index))
            .collect()
    };

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect()
}

/// Reads every well-formed row of a sink
pub fn read_sink(path: &Path) -> Result<Vec<CorpusRow>, CrawlError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(CORPUS_DELIMITER)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<CorpusRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!("Skipping malformed row in {}: {}", path.display(), e),
        }
    }
    Ok(rows)
}

/// Deletes per-category sinks after a successful merge
///
/// Returns the number of files removed. Missing files are ignored.
pub fn remove_sinks(sinks: &[PathBuf]) -> Result<usize, CrawlError> {
    let mut removed = 0;
    for sink in sinks {
        match std::fs::remove_file(sink) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}
