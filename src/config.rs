use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Dashboard settings, read from an optional `rusty-cord.toml`.
///
/// ```toml
/// dataset = "data/metadata.csv"
/// sample_size = 5
/// sample_seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset opened at start-up.
    pub dataset: PathBuf,
    /// Journals offered by the journal filter (most frequent first).
    pub journal_options: usize,
    /// Entries in the "top journals" chart and table.
    pub top_journals: usize,
    /// Random papers listed when no search is active.
    pub sample_size: usize,
    /// Search hits listed.
    pub search_result_limit: usize,
    pub author_bins: usize,
    pub abstract_bins: usize,
    pub title_preview_chars: usize,
    pub abstract_preview_chars: usize,
    /// Fixes the random sample for reproducible sessions.
    pub sample_seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("cord19_metadata.csv"),
            journal_options: 20,
            top_journals: 10,
            sample_size: 5,
            search_result_limit: 10,
            author_bins: 20,
            abstract_bins: 30,
            title_preview_chars: 100,
            abstract_preview_chars: 500,
            sample_seed: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }
}
