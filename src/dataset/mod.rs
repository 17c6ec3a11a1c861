//! Dataset input: read game rows from delimited files.

pub mod loader;

pub use loader::{load_records, DatasetLoader, DatasetOptions};
