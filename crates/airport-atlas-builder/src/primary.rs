use crate::error::BuildError;
use airport_atlas_core::codes;
use airport_atlas_core::AirportRecord;
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// One facility as published by the community airport database.
#[derive(Debug, Deserialize)]
struct FeedEntry {
    #[serde(default)]
    iata: Option<String>,
    #[serde(default)]
    icao: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, alias = "region")]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    elevation: Option<i32>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    tz: Option<String>,
    #[serde(default, rename = "type")]
    facility_type: Option<String>,
}

/// Accepts integers, floats (rounded) and numeric strings; anything else is absent.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let n = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    };
    Ok(n.and_then(|n| i32::try_from(n).ok()))
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

impl FeedEntry {
    fn into_record(self, iata: String) -> AirportRecord {
        let mut record = AirportRecord::new(iata);
        record.icao = non_empty(self.icao);
        record.name = self.name.unwrap_or_default();
        record.city = self.city.unwrap_or_default();
        record.state = non_empty(self.state);
        record.country = self.country.unwrap_or_default();
        record.elevation_ft = self.elevation;
        record.set_coordinates(self.lat, self.lon);
        record.timezone = non_empty(self.tz);
        record.facility_type = non_empty(self.facility_type);
        record
    }
}

/// Counters collected while filtering the primary feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub parsed: usize,
    pub missing_iata: usize,
    pub malformed_iata: usize,
    pub undecodable: usize,
    pub duplicates: usize,
}

/// Working table keyed by IATA code, kept in feed order.
#[derive(Debug, Default)]
pub struct PrimaryTable {
    records: Vec<AirportRecord>,
    index: HashMap<String, usize>,
    pub stats: IngestStats,
}

impl PrimaryTable {
    /// Inserts a record, or replaces the earlier one with the same code in place.
    /// Returns true when an earlier record was replaced.
    pub fn upsert(&mut self, record: AirportRecord) -> bool {
        if let Some(&i) = self.index.get(&record.iata) {
            self.records[i] = record;
            true
        } else {
            self.index.insert(record.iata.clone(), self.records.len());
            self.records.push(record);
            false
        }
    }

    pub fn records(&self) -> &[AirportRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [AirportRecord] {
        &mut self.records
    }

    pub fn into_records(self) -> Vec<AirportRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses the primary JSON feed, keeping only entries with a usable IATA code.
///
/// Entries sharing a code overwrite each other in feed order, so the last one
/// wins. The feed does not document its ordering, which makes this a
/// data-quality caveat rather than a guarantee.
pub fn parse_primary(bytes: &[u8]) -> Result<PrimaryTable, BuildError> {
    let doc: Value = serde_json::from_slice(bytes)?;
    let Value::Object(entries) = doc else {
        return Err(BuildError::NotAnObject);
    };

    let mut table = PrimaryTable::default();
    table.stats.parsed = entries.len();
    info!("Parsed {} entries from the primary feed", entries.len());

    for (facility_id, value) in entries {
        let mut entry: FeedEntry = match serde_json::from_value(value) {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    "Skipping undecodable feed entry — id={} error={}",
                    facility_id, e
                );
                table.stats.undecodable += 1;
                continue;
            }
        };

        let Some(raw_iata) = non_empty(entry.iata.take()) else {
            table.stats.missing_iata += 1;
            continue;
        };

        let Some(iata) = codes::normalize_iata(raw_iata.trim()) else {
            debug!(
                "Rejecting malformed IATA code — id={} iata={:?}",
                facility_id, raw_iata
            );
            table.stats.malformed_iata += 1;
            continue;
        };

        if table.upsert(entry.into_record(iata.clone())) {
            debug!(
                "Duplicate IATA code, later entry wins — iata={} id={}",
                iata, facility_id
            );
            table.stats.duplicates += 1;
        }
    }

    info!(
        "Filtered down to {} entries — missing_iata={} malformed_iata={} undecodable={} duplicates={}",
        table.len(),
        table.stats.missing_iata,
        table.stats.malformed_iata,
        table.stats.undecodable,
        table.stats.duplicates
    );

    if table.is_empty() {
        return Err(BuildError::NoRecords {
            parsed: table.stats.parsed,
        });
    }

    Ok(table)
}
