use std::cmp::Reverse;

use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, instrument};

use super::TextFileService;
use crate::{
    error::{AppError, CorpusError},
    storage::types::file_record::FileRecord,
    utils::{letters::most_frequent_letter, lines::Line},
};

/// A randomly picked line together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineResult {
    pub text: String,
    pub index: usize,
    pub file_name: String,
    pub most_frequent_letter: Option<char>,
}

/// Upper bound on blobs read at once while ranking the whole corpus.
const BLOB_READ_CONCURRENCY: usize = 16;

/// One entry of a longest-lines ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedLine {
    pub text: String,
    #[serde(rename = "line_number")]
    pub index: usize,
    pub file_name: String,
    /// Length in Unicode scalar values.
    pub length: usize,
}

impl RankedLine {
    fn from_line(line: Line, file_name: &str) -> Self {
        Self {
            length: line.char_len(),
            text: line.text,
            index: line.index,
            file_name: file_name.to_string(),
        }
    }
}

/// Sorts by length descending and keeps the first `k`.
///
/// The sort is stable, so equal-length lines keep their scan order.
fn rank_longest(mut entries: Vec<RankedLine>, k: usize) -> Vec<RankedLine> {
    entries.sort_by_key(|entry| Reverse(entry.length));
    entries.truncate(k);
    entries
}

impl TextFileService {
    /// Picks a uniformly random line of the most recently uploaded file.
    #[instrument(skip(self))]
    pub async fn pick_random_line(&self) -> Result<LineResult, AppError> {
        let record = self
            .catalog
            .most_recent()
            .await?
            .ok_or(CorpusError::NoFilesStored)?;

        let line = self.pick_line_from(&record).await?;
        let most_frequent_letter = most_frequent_letter(&line.text);

        Ok(LineResult {
            text: line.text,
            index: line.index,
            file_name: record.display_name,
            most_frequent_letter,
        })
    }

    /// Picks a file uniformly among all stored files that have lines, then a random line of
    /// it, reversed.
    ///
    /// The file is drawn from a single snapshot of the catalog, so files added concurrently
    /// cannot push the draw out of range. Files without lines are dropped from the snapshot and
    /// the draw repeats; only a corpus with no lines at all yields `NoFilesStored`.
    #[instrument(skip(self))]
    pub async fn pick_random_line_reversed(&self) -> Result<String, AppError> {
        let mut candidates = self.catalog.iterate_all().await?;

        while let Some(index) = self.draw_index(candidates.len()) {
            let record = candidates.swap_remove(index);

            match self.pick_line_from(&record).await {
                Ok(line) => {
                    debug!(file = %record.display_name, "Selected file for reversed line");
                    return Ok(line.text.chars().rev().collect());
                }
                Err(AppError::Corpus(CorpusError::EmptyContent(_))) => {
                    debug!(file = %record.display_name, "Skipping file without lines");
                }
                Err(err) => return Err(err),
            }
        }

        Err(CorpusError::NoFilesStored.into())
    }

    /// The `k` longest lines across every stored file.
    ///
    /// Equal lengths keep catalog order, then line order within a file. Files without lines
    /// contribute nothing.
    #[instrument(skip(self))]
    pub async fn top_longest_lines(&self, k: usize) -> Result<Vec<RankedLine>, AppError> {
        let records = self.catalog.iterate_all().await?;

        // `buffered` keeps catalog order, which the tie-break relies on.
        let reads: Vec<_> = records
            .iter()
            .map(|record| self.ranked_lines_of(record))
            .collect();
        let per_file: Vec<Vec<RankedLine>> = stream::iter(reads)
            .buffered(BLOB_READ_CONCURRENCY)
            .try_collect()
            .await?;

        let entries: Vec<RankedLine> = per_file.into_iter().flatten().collect();
        debug!(files = records.len(), lines = entries.len(), "Ranking corpus lines");

        Ok(rank_longest(entries, k))
    }

    /// The `k` longest lines of the most recently uploaded file.
    #[instrument(skip(self))]
    pub async fn top_longest_lines_in_latest_file(
        &self,
        k: usize,
    ) -> Result<Vec<RankedLine>, AppError> {
        let record = self
            .catalog
            .most_recent()
            .await?
            .ok_or(CorpusError::NoFilesStored)?;

        let entries = self.ranked_lines_of(&record).await?;
        Ok(rank_longest(entries, k))
    }

    async fn pick_line_from(&self, record: &FileRecord) -> Result<Line, AppError> {
        let lines = self.load_lines(record).await?;
        let index = self
            .draw_index(lines.len())
            .ok_or_else(|| CorpusError::EmptyContent(record.display_name.clone()))?;

        lines
            .into_iter()
            .nth(index)
            .ok_or_else(|| CorpusError::EmptyContent(record.display_name.clone()).into())
    }

    /// Lines of one file as ranking entries; an empty file yields none.
    async fn ranked_lines_of(&self, record: &FileRecord) -> Result<Vec<RankedLine>, AppError> {
        match self.load_lines(record).await {
            Ok(lines) => Ok(lines
                .into_iter()
                .map(|line| RankedLine::from_line(line, &record.display_name))
                .collect()),
            Err(AppError::Corpus(CorpusError::EmptyContent(_))) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }
}
