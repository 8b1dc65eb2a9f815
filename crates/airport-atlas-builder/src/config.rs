use crate::merge::MergePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PRIMARY_SOURCE: &str = "https://github.com/mwgg/Airports/raw/master/airports.json";
pub const DEFAULT_SECONDARY_SOURCE: &str =
    "https://davidmegginson.github.io/ourairports-data/airports.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for one dataset build. Every field has a default, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// URL or local path of the JSON airport database.
    pub primary_source: String,
    /// URL or local path of the CSV type feed. `None` disables enrichment.
    pub secondary_source: Option<String>,
    /// Per-fetch timeout.
    pub timeout_secs: u64,
    pub merge_policy: MergePolicy,
    /// Where the dataset artifact is written.
    pub output: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            primary_source: DEFAULT_PRIMARY_SOURCE.to_string(),
            secondary_source: Some(DEFAULT_SECONDARY_SOURCE.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            merge_policy: MergePolicy::default(),
            output: airport_atlas_core::default_dataset_path(),
        }
    }
}

impl BuildConfig {
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
