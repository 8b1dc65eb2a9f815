use crate::codes;
use crate::record::AirportRecord;
use crate::DatasetError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Version of the on-disk artifact layout. Bump on breaking changes.
pub const DATASET_FORMAT_VERSION: u32 = 1;

/// Outcome of enriching records from the secondary type feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub updated: usize,
    pub already_typed: usize,
    pub unmatched: usize,
    /// Set when the merge step did not run.
    #[serde(default)]
    pub skipped_reason: Option<String>,
}

impl EnrichmentStats {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.skipped_reason.is_some()
    }
}

/// Where and when a dataset was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub primary_source: Option<String>,
    #[serde(default)]
    pub secondary_source: Option<String>,
    #[serde(default)]
    pub enrichment: EnrichmentStats,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            primary_source: None,
            secondary_source: None,
            enrichment: EnrichmentStats::default(),
        }
    }
}

#[derive(Serialize)]
struct DatasetFileRef<'a> {
    version: u32,
    #[serde(flatten)]
    provenance: &'a Provenance,
    airports: &'a [AirportRecord],
}

#[derive(Deserialize)]
struct DatasetFile {
    #[serde(default)]
    version: u32,
    #[serde(flatten)]
    provenance: Provenance,
    airports: Vec<AirportRecord>,
}

/// Immutable table of airports keyed by IATA code.
///
/// Iteration follows the order records were supplied at construction. There is
/// no mutation API: build a new `Dataset` instead.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<AirportRecord>,
    index: HashMap<String, usize>,
    provenance: Provenance,
}

impl Dataset {
    /// Builds a dataset, validating every key and rejecting duplicates.
    pub fn from_records(
        records: Vec<AirportRecord>,
        provenance: Provenance,
    ) -> Result<Self, DatasetError> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if !codes::is_iata(&record.iata) {
                return Err(DatasetError::InvalidRecord {
                    index: i,
                    reason: format!("malformed IATA code {:?}", record.iata),
                });
            }
            if record.latitude.is_some() != record.longitude.is_some() {
                return Err(DatasetError::InvalidRecord {
                    index: i,
                    reason: format!("{} has only one of lat/lon", record.iata),
                });
            }
            if record.latitude.is_some_and(|v| !v.is_finite())
                || record.longitude.is_some_and(|v| !v.is_finite())
            {
                return Err(DatasetError::InvalidRecord {
                    index: i,
                    reason: format!("{} has a non-finite coordinate", record.iata),
                });
            }
            if index.insert(record.iata.clone(), i).is_some() {
                return Err(DatasetError::DuplicateKey(record.iata.clone()));
            }
        }

        Ok(Self {
            records,
            index,
            provenance,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        info!(
            "Loaded airport dataset — path={} airports={} generated_at={}",
            path.display(),
            dataset.len(),
            dataset.provenance.generated_at
        );
        Ok(dataset)
    }

    /// Parses an artifact; usable with `include_str!` to embed a dataset.
    pub fn from_json_str(content: &str) -> Result<Self, DatasetError> {
        Self::from_file(serde_json::from_str(content)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        Self::from_file(serde_json::from_reader(reader)?)
    }

    fn from_file(file: DatasetFile) -> Result<Self, DatasetError> {
        if file.version != DATASET_FORMAT_VERSION {
            return Err(DatasetError::UnsupportedVersion {
                found: file.version,
                expected: DATASET_FORMAT_VERSION,
            });
        }
        Self::from_records(file.airports, file.provenance)
    }

    pub fn to_json_string(&self) -> Result<String, DatasetError> {
        let file = DatasetFileRef {
            version: DATASET_FORMAT_VERSION,
            provenance: &self.provenance,
            airports: &self.records,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Writes the artifact next to `path` first and renames it into place,
    /// so readers never see a half-written file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = self.to_json_string()?;
        let tmp_path = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp_path, content).and_then(|_| fs::rename(&tmp_path, path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(
            "Dataset written — path={} airports={}",
            path.display(),
            self.len()
        );
        Ok(())
    }

    pub fn get(&self, iata: &str) -> Option<&AirportRecord> {
        self.index.get(iata).map(|&i| &self.records[i])
    }

    pub fn contains_key(&self, iata: &str) -> bool {
        self.index.contains_key(iata)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AirportRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[AirportRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a AirportRecord;
    type IntoIter = std::slice::Iter<'a, AirportRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn airport(iata: &str, country: &str) -> AirportRecord {
        let mut a = AirportRecord::new(iata);
        a.country = country.to_string();
        a
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let records = vec![airport("MEX", "MX"), airport("MEX", "MX")];
        let err = Dataset::from_records(records, Provenance::default()).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateKey(code) if code == "MEX"));
    }

    #[test]
    fn test_rejects_malformed_keys() {
        let records = vec![airport("MEX", "MX"), airport("mty", "MX")];
        let err = Dataset::from_records(records, Provenance::default()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn test_rejects_half_coordinates() {
        let mut a = airport("MEX", "MX");
        a.latitude = Some(19.4);
        let err = Dataset::from_records(vec![a], Provenance::default()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let mut a = airport("MEX", "MX");
        a.latitude = Some(f64::NAN);
        a.longitude = Some(1.0);
        let err = Dataset::from_records(vec![a], Provenance::default()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRecord { index: 0, .. }));

        let mut b = airport("LHR", "GB");
        b.latitude = Some(51.47);
        b.longitude = Some(f64::INFINITY);
        let err =
            Dataset::from_records(vec![airport("MEX", "MX"), b], Provenance::default()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // a directory squatting on the output path makes the rename fail
        let path = dir.path().join("airports.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let ds = Dataset::from_records(vec![airport("MEX", "MX")], Provenance::default()).unwrap();
        assert!(ds.save(&path).is_err());
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_from_reader_matches_from_json_str() {
        let ds = Dataset::from_records(
            vec![airport("MEX", "MX"), airport("LHR", "GB")],
            Provenance::default(),
        )
        .unwrap();
        let json = ds.to_json_string().unwrap();

        let from_reader = Dataset::from_reader(json.as_bytes()).unwrap();
        let from_str = Dataset::from_json_str(&json).unwrap();
        assert_eq!(from_reader.records(), from_str.records());
        assert_eq!(from_reader.provenance(), ds.provenance());
    }

    #[test]
    fn test_preserves_order() {
        let records = vec![airport("ZCL", "MX"), airport("AAA", "PF"), airport("MEX", "MX")];
        let ds = Dataset::from_records(records, Provenance::default()).unwrap();
        let codes: Vec<&str> = ds.iter().map(|a| a.iata.as_str()).collect();
        assert_eq!(codes, vec!["ZCL", "AAA", "MEX"]);
        assert_eq!(ds.get("AAA").unwrap().country, "PF");
        assert!(ds.get("aaa").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("airports.json");

        let mut mex = airport("MEX", "MX");
        mex.icao = Some("MMMX".to_string());
        mex.elevation_ft = Some(7316);
        mex.set_coordinates(Some(19.4363), Some(-99.072098));
        mex.timezone = Some("America/Mexico_City".to_string());
        mex.facility_type = Some("large_airport".to_string());
        mex.state = Some("Distrito Federal".to_string());

        let provenance = Provenance {
            primary_source: Some("airports.json".to_string()),
            enrichment: EnrichmentStats {
                updated: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let ds = Dataset::from_records(vec![mex.clone(), airport("LHR", "GB")], provenance)
            .unwrap();
        ds.save(&path).unwrap();

        assert!(!path.with_extension("json.tmp").exists());

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("MEX"), Some(&mex));
        assert_eq!(loaded.provenance(), ds.provenance());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let json = r#"{"version": 99, "generated_at": "2026-01-01T00:00:00Z", "airports": []}"#;
        let err = Dataset::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::UnsupportedVersion { found: 99, expected: 1 }
        ));
    }
}
