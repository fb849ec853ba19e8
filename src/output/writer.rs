use crate::state::{ArticleRecord, Quota};
use crate::CrawlError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column names of every corpus sink, in order
pub const CORPUS_HEADERS: [&str; 4] = ["headline", "text", "category", "url"];

/// Field delimiter of every corpus sink
pub const CORPUS_DELIMITER: u8 = b'\t';

/// One row of a corpus sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRow {
    pub headline: String,
    pub text: String,
    pub category: String,
    pub url: String,
}

impl From<&ArticleRecord> for CorpusRow {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            headline: record.headline.clone().unwrap_or_default(),
            text: record.body.clone().unwrap_or_default(),
            category: record.category.clone(),
            url: record.url.to_string(),
        }
    }
}

/// Writes the accepted articles of one category
///
/// The sink is tab-separated with a header row. Fields containing tabs,
/// quotes or newlines are quoted. Writes stop being accepted once the
/// category quota is reached.
pub struct CorpusWriter {
    writer: csv::Writer<File>,
    quota: Quota,
    accepted: usize,
}

impl CorpusWriter {
    /// Creates (or truncates) a sink and writes the header row
    pub fn create(path: &Path, quota: Quota) -> Result<Self, CrawlError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = corpus_writer_builder().from_path(path)?;
        writer.write_record(CORPUS_HEADERS)?;

        Ok(Self {
            writer,
            quota,
            accepted: 0,
        })
    }

    /// Appends a record
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The row was written
    /// * `Ok(false)` - The quota is full or the record has no body
    pub fn write(&mut self, record: &ArticleRecord) -> Result<bool, CrawlError> {
        if self.is_full() || !record.has_body() {
            return Ok(false);
        }

        self.writer.serialize(CorpusRow::from(record))?;
        self.accepted += 1;
        Ok(true)
    }

    /// Returns true once the quota has been reached
    pub fn is_full(&self) -> bool {
        self.quota.is_satisfied(self.accepted)
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Flushes the sink and returns the number of rows written
    pub fn finish(mut self) -> Result<usize, CrawlError> {
        self.writer.flush()?;
        Ok(self.accepted)
    }
}

/// Writes a full set of rows to a sink
pub fn write_rows(path: &Path, rows: &[CorpusRow]) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = corpus_writer_builder().from_path(path)?;
    writer.write_record(CORPUS_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn corpus_writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(CORPUS_DELIMITER).has_headers(false);
    builder
}

/// Returns the per-category sink path for a corpus path
///
/// `data/corpus.tsv` and category `WORLD NEWS` give
/// `data/WORLD_NEWS_corpus.tsv`.
pub fn category_sink_path(corpus_path: &Path, category: &str) -> PathBuf {
    let file_name = corpus_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus.tsv".to_string());
    let name = format!("{}_{}", clean_category_name(category), file_name);

    match corpus_path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Makes a category name safe to use in a file name
pub fn clean_category_name(category: &str) -> String {
    category
        .replace(' ', "_")
        .replace(['\\', '/', '(', ')'], "")
}

/// Identity of a category's sink file
///
/// Two categories with the same key would write the same sink, so names
/// are compared by this key wherever uniqueness matters. Case is ignored
/// to stay safe on case-insensitive filesystems.
pub fn category_sink_key(category: &str) -> String {
    clean_category_name(category.trim()).to_ascii_uppercase()
}
