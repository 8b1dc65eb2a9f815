// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};

/// One airport, keyed by its IATA code.
///
/// Field names on the wire follow the community airport database
/// (`elevation`, `lat`, `lon`, `tz`, `type`) so an artifact record reads
/// the same as a source feed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    pub iata: String,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    /// State or region name.
    #[serde(default)]
    pub state: Option<String>,
    /// ISO 3166 alpha-2, stored as provided by the source feed.
    #[serde(default)]
    pub country: String,
    #[serde(default, rename = "elevation")]
    pub elevation_ft: Option<i32>,
    #[serde(default, rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, rename = "lon")]
    pub longitude: Option<f64>,
    #[serde(default, rename = "tz")]
    pub timezone: Option<String>,
    /// Free-text classification such as `large_airport` or `heliport`.
    #[serde(default, rename = "type")]
    pub facility_type: Option<String>,
}

impl AirportRecord {
    pub fn new(iata: impl Into<String>) -> Self {
        Self {
            iata: iata.into(),
            icao: None,
            name: String::new(),
            city: String::new(),
            state: None,
            country: String::new(),
            elevation_ft: None,
            latitude: None,
            longitude: None,
            timezone: None,
            facility_type: None,
        }
    }

    /// Latitude and longitude, only when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn is_geolocated(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Sets both coordinates, or clears both if either is missing or not finite.
    pub fn set_coordinates(&mut self, lat: Option<f64>, lon: Option<f64>) {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                self.latitude = Some(lat);
                self.longitude = Some(lon);
            }
            _ => {
                self.latitude = None;
                self.longitude = None;
            }
        }
    }

    /// The facility type if it is present and not blank.
    pub fn facility_type(&self) -> Option<&str> {
        self.facility_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn has_facility_type(&self, facility_type: &str) -> bool {
        self.facility_type()
            .is_some_and(|t| t.to_lowercase() == facility_type.to_lowercase())
    }
}
