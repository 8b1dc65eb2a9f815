// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::codes;
use crate::dataset::Dataset;
use crate::geo::GeoPoint;
use crate::record::AirportRecord;
use crate::{DatasetError, QueryError};
use std::path::Path;
use std::sync::Arc;

/// Closest airport to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch<'a> {
    pub airport: &'a AirportRecord,
    pub distance_km: f64,
}

/// Read-only query engine over an immutable [`Dataset`].
///
/// Cloning is cheap and clones share the same table, so a library can be
/// handed to any number of threads.
#[derive(Debug, Clone)]
pub struct AirportLibrary {
    dataset: Arc<Dataset>,
}

impl AirportLibrary {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        Ok(Self::from(Dataset::load(path)?))
    }

    /// Exact lookup by IATA code (case-insensitive).
    ///
    /// Returns `Ok(None)` for a well-formed code that is not in the dataset.
    pub fn find(&self, iata: &str) -> Result<Option<&AirportRecord>, QueryError> {
        let code =
            codes::normalize_iata(iata).ok_or_else(|| QueryError::InvalidIata(iata.to_string()))?;
        Ok(self.dataset.get(&code))
    }

    /// Malformed codes are simply reported as absent.
    pub fn exists(&self, iata: &str) -> bool {
        self.dataset.contains_key(&iata.to_ascii_uppercase())
    }

    /// All airports in the given ISO 3166 alpha-2 country, in dataset order.
    pub fn find_by_country(&self, country: &str) -> Result<Vec<&AirportRecord>, QueryError> {
        let country = codes::normalize_country(country)
            .ok_or_else(|| QueryError::InvalidCountry(country.to_string()))?;
        Ok(self
            .dataset
            .iter()
            .filter(|a| a.country == country)
            .collect())
    }

    /// Airports whose facility type equals any of `types`, ignoring case.
    /// Airports without a facility type never match.
    pub fn find_by_types(&self, types: &[&str]) -> Result<Vec<&AirportRecord>, QueryError> {
        if types.is_empty() {
            return Err(QueryError::EmptyTypeList);
        }
        let wanted: Vec<String> = types.iter().map(|t| t.to_lowercase()).collect();
        Ok(self
            .dataset
            .iter()
            .filter(|a| {
                a.facility_type()
                    .is_some_and(|t| wanted.contains(&t.to_lowercase()))
            })
            .collect())
    }

    /// Closest geolocated airport to `(lat, lon)`, optionally restricted to
    /// `types`. An empty `types` slice searches the whole dataset.
    ///
    /// Ties on exactly equal distance go to the airport that comes first in
    /// dataset order. That order follows the source feed, so which airport wins
    /// a tie may change between dataset builds.
    pub fn find_nearest(
        &self,
        lat: f64,
        lon: f64,
        types: &[&str],
    ) -> Result<Option<&AirportRecord>, QueryError> {
        Ok(self
            .find_nearest_with_distance(lat, lon, types)?
            .map(|m| m.airport))
    }

    pub fn find_nearest_with_distance(
        &self,
        lat: f64,
        lon: f64,
        types: &[&str],
    ) -> Result<Option<NearestMatch<'_>>, QueryError> {
        let origin = GeoPoint::new(lat, lon);
        if !origin.is_valid() {
            return Err(QueryError::InvalidCoordinate { lat, lon });
        }

        let candidates: Vec<&AirportRecord> = if types.is_empty() {
            self.dataset.iter().collect()
        } else {
            self.find_by_types(types)?
        };

        let mut best: Option<NearestMatch<'_>> = None;
        for airport in candidates {
            let Some((a_lat, a_lon)) = airport.coordinates() else {
                continue;
            };
            let distance_km = origin.distance_km(&GeoPoint::new(a_lat, a_lon));
            if best.map_or(true, |b| distance_km < b.distance_km) {
                best = Some(NearestMatch {
                    airport,
                    distance_km,
                });
            }
        }

        Ok(best)
    }

    /// The complete dataset.
    pub fn full_list(&self) -> &Dataset {
        &self.dataset
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

impl From<Dataset> for AirportLibrary {
    fn from(dataset: Dataset) -> Self {
        Self::new(Arc::new(dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Provenance;

    fn airport(
        iata: &str,
        country: &str,
        ty: Option<&str>,
        coords: Option<(f64, f64)>,
    ) -> AirportRecord {
        let mut a = AirportRecord::new(iata);
        a.country = country.to_string();
        a.facility_type = ty.map(|t| t.to_string());
        if let Some((lat, lon)) = coords {
            a.set_coordinates(Some(lat), Some(lon));
        }
        a
    }

    fn library(records: Vec<AirportRecord>) -> AirportLibrary {
        Dataset::from_records(records, Provenance::default())
            .unwrap()
            .into()
    }

    #[test]
    fn test_find_normalizes_case() {
        let lib = library(vec![airport("LMM", "MX", None, None)]);
        assert_eq!(lib.find("lmm").unwrap().unwrap().iata, "LMM");
        assert_eq!(lib.find("ZZZ").unwrap(), None);
        assert_eq!(
            lib.find("WXZY1"),
            Err(QueryError::InvalidIata("WXZY1".to_string()))
        );
    }

    #[test]
    fn test_exists_never_errors() {
        let lib = library(vec![airport("LMM", "MX", None, None)]);
        assert!(lib.exists("LMM"));
        assert!(lib.exists("lmm"));
        assert!(!lib.exists("ZZZ"));
        assert!(!lib.exists("WXZY1"));
        assert!(!lib.exists(""));
    }

    #[test]
    fn test_non_ascii_input_is_not_case_folded() {
        let lib = library(vec![
            airport("SSA", "BR", None, None),
            airport("FFI", "XX", None, None),
        ]);
        assert_eq!(lib.find("ßa"), Err(QueryError::InvalidIata("ßa".to_string())));
        assert!(matches!(lib.find("\u{fb03}"), Err(QueryError::InvalidIata(_))));
        assert!(!lib.exists("ßa"));
        assert!(!lib.exists("\u{fb03}"));
        assert!(lib.exists("ssa"));
    }

    #[test]
    fn test_nearest_skips_ungeolocated() {
        let lib = library(vec![
            airport("AAA", "MX", None, None),
            airport("BBB", "MX", None, Some((10.0, 10.0))),
        ]);
        let m = lib.find_nearest_with_distance(0.0, 0.0, &[]).unwrap().unwrap();
        assert_eq!(m.airport.iata, "BBB");
        assert!(m.distance_km > 0.0);
    }

    #[test]
    fn test_nearest_tie_keeps_first() {
        let lib = library(vec![
            airport("EEE", "XX", None, Some((0.0, 1.0))),
            airport("WWW", "XX", None, Some((0.0, -1.0))),
        ]);
        let nearest = lib.find_nearest(0.0, 0.0, &[]).unwrap().unwrap();
        assert_eq!(nearest.iata, "EEE");
    }

    #[test]
    fn test_nearest_empty_candidates() {
        let lib = library(vec![airport("AAA", "MX", Some("heliport"), None)]);
        assert_eq!(lib.find_nearest(0.0, 0.0, &[]).unwrap(), None);
        assert_eq!(lib.find_nearest(0.0, 0.0, &["heliport"]).unwrap(), None);
        assert_eq!(lib.find_nearest(0.0, 0.0, &["seaplane_base"]).unwrap(), None);
    }

    #[test]
    fn test_nearest_rejects_bad_coordinates() {
        let lib = library(vec![airport("AAA", "MX", None, Some((1.0, 1.0)))]);
        assert!(matches!(
            lib.find_nearest(95.0, 0.0, &[]),
            Err(QueryError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            lib.find_nearest(0.0, f64::INFINITY, &[]),
            Err(QueryError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_clones_share_dataset() {
        let lib = library(vec![airport("AAA", "MX", None, None)]);
        let other = lib.clone();
        assert!(Arc::ptr_eq(&lib.dataset(), &other.dataset()));
    }
}
