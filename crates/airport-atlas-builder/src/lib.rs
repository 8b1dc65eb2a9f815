// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod primary;
pub mod secondary;

pub use config::BuildConfig;
pub use error::{BuildError, EnrichmentError, FetchError};
pub use merge::MergePolicy;
pub use primary::IngestStats;

use airport_atlas_core::{Dataset, EnrichmentStats, Provenance};
use chrono::Utc;
use fetch::Source;
use log::{info, warn};
use secondary::TypeFeed;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub ingest: IngestStats,
    pub enrichment: EnrichmentStats,
    pub airports: usize,
    /// Set once the artifact has been written.
    pub output: Option<PathBuf>,
}

/// Runs the offline pipeline: primary feed, optional type feed, merge, emit.
pub struct DatasetBuilder {
    config: BuildConfig,
}

impl DatasetBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Builds the dataset in memory without writing anything.
    pub fn build(&self) -> Result<(Dataset, BuildReport), BuildError> {
        let timeout = self.config.timeout();

        let primary = Source::parse(&self.config.primary_source);
        let bytes = fetch::fetch_bytes(&primary, timeout).map_err(|error| BuildError::Fetch {
            source_name: primary.to_string(),
            error,
        })?;
        let mut table = primary::parse_primary(&bytes)?;

        let enrichment = match &self.config.secondary_source {
            None => {
                info!("No type feed configured; skipping facility type merge");
                EnrichmentStats::skipped("no type feed configured")
            }
            Some(src) => match load_type_feed(&Source::parse(src), timeout) {
                Ok(feed) => {
                    merge::merge_types(table.records_mut(), &feed, self.config.merge_policy)
                }
                Err(e) => {
                    warn!(
                        "Type feed unavailable; facility type merge skipped — source={} error={}",
                        src, e
                    );
                    EnrichmentStats::skipped(e.to_string())
                }
            },
        };

        let ingest = table.stats.clone();
        let provenance = Provenance {
            generated_at: Utc::now(),
            primary_source: Some(self.config.primary_source.clone()),
            secondary_source: self.config.secondary_source.clone(),
            enrichment: enrichment.clone(),
        };
        let dataset = Dataset::from_records(table.into_records(), provenance)?;

        let report = BuildReport {
            ingest,
            enrichment,
            airports: dataset.len(),
            output: None,
        };
        Ok((dataset, report))
    }

    /// Builds the dataset and writes it to the configured output path.
    /// On any error the output path is left untouched.
    pub fn build_and_save(&self) -> Result<BuildReport, BuildError> {
        let (dataset, mut report) = self.build()?;
        dataset.save(&self.config.output)?;
        info!(
            "Dataset written — path={} airports={}",
            self.config.output.display(),
            report.airports
        );
        report.output = Some(self.config.output.clone());
        Ok(report)
    }
}

fn load_type_feed(source: &Source, timeout: Duration) -> Result<TypeFeed, EnrichmentError> {
    let bytes = fetch::fetch_bytes(source, timeout)?;
    secondary::parse_type_feed(&bytes)
}
