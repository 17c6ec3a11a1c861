//! In-memory genre graph and its builder.
//!
//! The graph maps each genre label to the names of the games tagged with it,
//! in dataset row order. Nothing is sorted or deduplicated: a game listed
//! twice under the same genre appears twice.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::graph::cancel::CancellationToken;
use crate::types::GameRecord;

/// Separator between genre labels in the dataset's genres column.
pub const DEFAULT_GENRE_DELIMITER: &str = "||";

/// Number of progress reports a full build emits.
pub const DEFAULT_PROGRESS_CHUNKS: usize = 100;

// ---------------------------------------------------------------------------
// GenreGraph
// ---------------------------------------------------------------------------

/// Adjacency mapping from genre label to game names.
///
/// Every key has a non-empty list. The graph is never mutated once built;
/// share it behind an `Arc` across traversals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreGraph {
    adjacency: HashMap<String, Vec<String>>,
    /// Genre keys in first-seen order.
    order: Vec<String>,
}

impl GenreGraph {
    /// Build a graph with the default `||` delimiter and no progress reporting.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a GameRecord>,
    {
        let mut graph = Self::default();
        for record in records {
            graph.insert_record(record, DEFAULT_GENRE_DELIMITER);
        }
        graph
    }

    /// Append `record`'s name under each of its genres.
    ///
    /// Returns the number of edges added, `None` when the row was skipped.
    fn insert_record(&mut self, record: &GameRecord, delimiter: &str) -> Option<usize> {
        let (name, genres) = record.fields()?;
        let mut added = 0;
        for genre in genres.split(delimiter) {
            match self.adjacency.get_mut(genre) {
                Some(games) => games.push(name.to_string()),
                None => {
                    self.order.push(genre.to_string());
                    self.adjacency
                        .insert(genre.to_string(), vec![name.to_string()]);
                }
            }
            added += 1;
        }
        Some(added)
    }

    /// Games listed under `label`, empty when the label is not a key.
    pub fn games(&self, label: &str) -> &[String] {
        self.adjacency
            .get(label)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_genre(&self, label: &str) -> bool {
        self.adjacency.contains_key(label)
    }

    /// Genre labels in the order they were first seen.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn genre_count(&self) -> usize {
        self.order.len()
    }

    /// Total number of (genre, game) entries, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, Vec<String>> {
        &self.adjacency
    }
}

// ---------------------------------------------------------------------------
// BuildStats
// ---------------------------------------------------------------------------

/// What a build consumed and produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub genres: usize,
    pub edges: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "duration_as_millis")]
    pub elapsed: Duration,
}

fn duration_as_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

// ---------------------------------------------------------------------------
// BuildProgress
// ---------------------------------------------------------------------------

/// Receives row-level progress while a graph is being built.
pub trait BuildProgress {
    /// `processed` rows out of `total` have been consumed.
    fn on_rows(&mut self, processed: usize, total: usize);

    fn on_complete(&mut self, _stats: &BuildStats) {}
}

impl<F: FnMut(usize, usize)> BuildProgress for F {
    fn on_rows(&mut self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Progress sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BuildProgress for NoProgress {
    fn on_rows(&mut self, _processed: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Builds a [`GenreGraph`] in chunks, reporting progress between chunks.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    delimiter: String,
    progress_chunks: usize,
    cancel: CancellationToken,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_GENRE_DELIMITER.to_string(),
            progress_chunks: DEFAULT_PROGRESS_CHUNKS,
            cancel: CancellationToken::default(),
        }
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        if !delimiter.is_empty() {
            self.delimiter = delimiter;
        }
        self
    }

    /// How many progress reports to aim for. Clamped to at least one.
    pub fn progress_chunks(mut self, chunks: usize) -> Self {
        self.progress_chunks = chunks.max(1);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build the graph, checking for cancellation between chunks.
    pub fn build(
        &self,
        records: &[GameRecord],
        progress: &mut dyn BuildProgress,
    ) -> Result<(GenreGraph, BuildStats)> {
        let started = Instant::now();
        let total = records.len();
        let chunk_size = (total / self.progress_chunks).max(1);

        let mut graph = GenreGraph::default();
        let mut skipped = 0;
        let mut processed = 0;

        progress.on_rows(0, total);
        for chunk in records.chunks(chunk_size) {
            self.cancel.check()?;
            for record in chunk {
                if graph.insert_record(record, &self.delimiter).is_none() {
                    skipped += 1;
                }
            }
            processed += chunk.len();
            debug!(processed, total, "build chunk done");
            progress.on_rows(processed, total);
        }

        if skipped > 0 {
            warn!(skipped, "skipped rows missing a name or genres");
        }

        let stats = BuildStats {
            rows_read: total,
            rows_skipped: skipped,
            genres: graph.genre_count(),
            edges: graph.edge_count(),
            elapsed: started.elapsed(),
        };
        info!(
            rows = stats.rows_read,
            skipped = stats.rows_skipped,
            genres = stats.genres,
            edges = stats.edges,
            "graph built"
        );
        progress.on_complete(&stats);
        Ok((graph, stats))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
