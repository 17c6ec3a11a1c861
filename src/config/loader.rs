//! Multi-source config loading.
//!
//! Priority, lowest to highest: built-in defaults, YAML file, environment
//! variables. CLI flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::schema::GenreGraphConfig;
use crate::error::{GenreGraphError, Result};

/// File name searched for in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "genregraph.yaml";

/// Overrides `dataset.path`.
pub const ENV_DATASET: &str = "GENREGRAPH_DATASET";
/// Overrides `traversal.step_delay_ms`.
pub const ENV_STEP_DELAY_MS: &str = "GENREGRAPH_STEP_DELAY_MS";

/// Load configuration, reading the process environment for overrides.
///
/// An explicit path must exist. Without one, the first existing file among
/// [`default_config_paths`] is used, and having none is fine.
pub fn load_config(explicit: Option<&Path>) -> Result<GenreGraphConfig> {
    load_config_with(explicit, &default_config_paths(), |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with the search paths and env lookup injected.
pub fn load_config_with(
    explicit: Option<&Path>,
    search: &[PathBuf],
    env: impl Fn(&str) -> Option<String>,
) -> Result<GenreGraphConfig> {
    let source = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(GenreGraphError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path.to_path_buf())
        }
        None => search.iter().find(|p| p.is_file()).cloned(),
    };

    let mut config = match &source {
        Some(path) => {
            debug!(path = %path.display(), "reading config");
            parse_config(&std::fs::read_to_string(path)?)?
        }
        None => GenreGraphConfig::default(),
    };

    apply_env(&mut config, env)?;
    validate(&config)?;
    Ok(config)
}

/// Parse YAML text into a config.
pub fn parse_config(text: &str) -> Result<GenreGraphConfig> {
    if text.trim().is_empty() {
        return Ok(GenreGraphConfig::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// `./genregraph.yaml`, then the platform config directory.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "genregraph") {
        paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    paths
}

fn apply_env(config: &mut GenreGraphConfig, env: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(path) = env(ENV_DATASET).filter(|v| !v.trim().is_empty()) {
        config.dataset.path = Some(PathBuf::from(path));
    }
    if let Some(raw) = env(ENV_STEP_DELAY_MS) {
        config.traversal.step_delay_ms = raw.trim().parse().map_err(|_| {
            GenreGraphError::Config(format!("{ENV_STEP_DELAY_MS} must be an integer, got '{raw}'"))
        })?;
    }
    Ok(())
}

fn validate(config: &GenreGraphConfig) -> Result<()> {
    if config.dataset.genre_delimiter.is_empty() {
        return Err(GenreGraphError::Config("dataset.genre_delimiter must not be empty".into()));
    }
    if config.dataset.reader_options().is_none() {
        return Err(GenreGraphError::Config(format!(
            "dataset.field_delimiter must be a single ASCII character, got '{}'",
            config.dataset.field_delimiter
        )));
    }
    if config.build.progress_chunks == 0 {
        return Err(GenreGraphError::Config("build.progress_chunks must be at least 1".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
