//! Configuration: YAML schema plus file and environment loading.

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_with};
pub use schema::{BuildConfig, DatasetConfig, GenreGraphConfig, TraversalConfig};
