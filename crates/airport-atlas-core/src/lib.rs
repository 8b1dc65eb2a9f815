// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod codes;
pub mod dataset;
pub mod geo;
pub mod library;
pub mod record;

pub use dataset::{Dataset, EnrichmentStats, Provenance, DATASET_FORMAT_VERSION};
pub use geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use library::{AirportLibrary, NearestMatch};
pub use record::AirportRecord;

use std::path::PathBuf;
use thiserror::Error;

/// Malformed query input. Absence of data is never reported through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid/malformed IATA code: {0:?} (expecting 3 letters)")]
    InvalidIata(String),
    #[error("Invalid/malformed country code: {0:?} (expecting ISO 3166 ALPHA-2)")]
    InvalidCountry(String),
    #[error("At least one facility type is required")]
    EmptyTypeList,
    #[error("Invalid coordinate: lat={lat} lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported dataset format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Invalid record at position {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("Duplicate IATA code in dataset: {0}")]
    DuplicateKey(String),
}

/// Platform data directory holding the built dataset artifact.
pub fn get_data_root() -> PathBuf {
    directories::ProjectDirs::from("org", "airport-atlas", "Airport-Atlas")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default location of the dataset artifact.
pub fn default_dataset_path() -> PathBuf {
    get_data_root().join("airports.json")
}
