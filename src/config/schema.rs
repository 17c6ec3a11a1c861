//! Configuration data structures for genregraph.
//!
//! Defines the YAML config format: dataset location and parsing, build
//! progress granularity, and traversal pacing. Every field has a default so a
//! partial file (or none at all) is valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetOptions;
use crate::graph::store::{DEFAULT_GENRE_DELIMITER, DEFAULT_PROGRESS_CHUNKS};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreGraphConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,
}

impl Default for GenreGraphConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            dataset: DatasetConfig::default(),
            build: BuildConfig::default(),
            traversal: TraversalConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetConfig
// ---------------------------------------------------------------------------

/// Where the dataset lives and how to split it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset file. May be supplied on the command line instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Single-character field separator.
    #[serde(default = "default_field_delimiter")]
    pub field_delimiter: char,

    /// Separator between labels in the genres column.
    #[serde(default = "default_genre_delimiter")]
    pub genre_delimiter: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: None,
            field_delimiter: default_field_delimiter(),
            genre_delimiter: default_genre_delimiter(),
        }
    }
}

impl DatasetConfig {
    /// Reader options, or `None` when the field delimiter is not a single
    /// ASCII byte.
    pub fn reader_options(&self) -> Option<DatasetOptions> {
        if !self.field_delimiter.is_ascii() {
            return None;
        }
        Some(DatasetOptions {
            field_delimiter: self.field_delimiter as u8,
        })
    }
}

// ---------------------------------------------------------------------------
// BuildConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// How many progress updates a full build emits.
    #[serde(default = "default_progress_chunks")]
    pub progress_chunks: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            progress_chunks: default_progress_chunks(),
        }
    }
}

// ---------------------------------------------------------------------------
// TraversalConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Pause after each visited label, in milliseconds. `0` disables pacing.
    #[serde(default)]
    pub step_delay_ms: u64,

    /// Emit a progress event every N visited labels.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,

    /// How many visited labels the results preview lists.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 0,
            progress_every: default_progress_every(),
            preview_limit: default_preview_limit(),
        }
    }
}

impl TraversalConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_field_delimiter() -> char {
    ','
}

fn default_genre_delimiter() -> String {
    DEFAULT_GENRE_DELIMITER.to_string()
}

fn default_progress_chunks() -> usize {
    DEFAULT_PROGRESS_CHUNKS
}

fn default_progress_every() -> usize {
    1
}

fn default_preview_limit() -> usize {
    150
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
