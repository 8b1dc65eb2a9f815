use crate::secondary::TypeFeed;
use airport_atlas_core::{AirportRecord, EnrichmentStats};
use log::info;
use serde::{Deserialize, Serialize};

/// What to do when a record already carries a facility type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep the primary feed's type and ignore the type feed.
    #[default]
    PreserveExisting,
    /// Replace it with the type feed's value when one exists.
    Overwrite,
}

pub fn merge_types(
    records: &mut [AirportRecord],
    feed: &TypeFeed,
    policy: MergePolicy,
) -> EnrichmentStats {
    let mut stats = EnrichmentStats::default();

    for record in records.iter_mut() {
        let has_type = record.facility_type().is_some();
        if has_type && policy == MergePolicy::PreserveExisting {
            stats.already_typed += 1;
            continue;
        }

        match feed.get(&record.iata) {
            Some(facility_type) => {
                record.facility_type = Some(facility_type.to_string());
                stats.updated += 1;
            }
            None if has_type => stats.already_typed += 1,
            None => stats.unmatched += 1,
        }
    }

    info!(
        "Merged facility types — updated={} already_typed={} unmatched={} policy={:?}",
        stats.updated, stats.already_typed, stats.unmatched, policy
    );
    stats
}
