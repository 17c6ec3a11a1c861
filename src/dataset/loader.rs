//! Delimited-file reader for game datasets.
//!
//! Only the `name` and `genres` columns are read; every other column is
//! ignored. Empty cells become `None` so the graph builder can skip the row.
//! Cells are decoded lossily: a stray non-UTF-8 byte in one title should not
//! sink a whole dataset.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{GenreGraphError, Result};
use crate::types::GameRecord;

/// Header of the column holding the game title.
pub const NAME_COLUMN: &str = "name";
/// Header of the column holding the delimited genre list.
pub const GENRES_COLUMN: &str = "genres";

/// How to read the dataset file.
#[derive(Debug, Clone, Copy)]
pub struct DatasetOptions {
    /// Field separator byte, `,` for CSV.
    pub field_delimiter: u8,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            field_delimiter: b',',
        }
    }
}

/// Thin wrapper around `csv::Reader` that yields [`GameRecord`]s.
pub struct DatasetLoader {
    opts: DatasetOptions,
}

impl DatasetLoader {
    pub fn new(opts: DatasetOptions) -> Self {
        Self { opts }
    }

    /// Read every record from the file at `path`.
    pub fn load_path(&self, path: &Path) -> Result<Vec<GameRecord>> {
        let file = File::open(path).map_err(|e| {
            GenreGraphError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })?;
        let records = self.load_reader(file)?;
        info!(path = %path.display(), rows = records.len(), "dataset loaded");
        Ok(records)
    }

    /// Read every record from `reader`. The first line must be a header.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<GameRecord>> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.opts.field_delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.byte_headers()?.clone();
        let name_idx = column_index(&headers, NAME_COLUMN)?;
        let genres_idx = column_index(&headers, GENRES_COLUMN)?;
        debug!(name_idx, genres_idx, columns = headers.len(), "resolved dataset columns");

        let mut records = Vec::new();
        for row in rdr.byte_records() {
            let row = row?;
            records.push(GameRecord {
                name: cell(&row, name_idx),
                genres: cell(&row, genres_idx),
            });
        }
        Ok(records)
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(DatasetOptions::default())
    }
}

/// Convenience: load `path` with default CSV settings.
pub fn load_records(path: &Path) -> Result<Vec<GameRecord>> {
    DatasetLoader::default().load_path(path)
}

fn column_index(headers: &csv::ByteRecord, wanted: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| String::from_utf8_lossy(h).trim().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| GenreGraphError::MissingColumn(wanted.to_string()))
}

fn cell(row: &csv::ByteRecord, idx: usize) -> Option<String> {
    row.get(idx)
        .filter(|raw| !raw.is_empty())
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
