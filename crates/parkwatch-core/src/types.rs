//! Canonical parking data model shared by the feed, server and CLI.

use serde::{Deserialize, Serialize};

/// A WGS84 position in `(lat, lon)` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Occupancy derived from the upstream status or count fields.
///
/// `Unknown` is kept distinct so a future upstream that separates "no data"
/// from "occupied" can be surfaced, but it is never reported as free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    Free,
    Occupied,
    Unknown,
}

impl Occupancy {
    #[must_use]
    pub fn is_occupied(self) -> bool {
        !matches!(self, Occupancy::Free)
    }
}

/// One normalized space or lot report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingRecord {
    /// `None` when the upstream name is missing or blank.
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub is_accessible: bool,
    pub occupancy: Occupancy,
    pub weekday_fee: Option<String>,
    pub service_hours: Option<String>,
    /// Meters from the query point; only range-query sources report it.
    pub distance: Option<f64>,
    pub address: Option<String>,
    /// Space outline from the legacy `wkt` field, in `(lat, lon)` order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polygon: Vec<Coordinate>,
}

impl ParkingRecord {
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupancy.is_occupied()
    }

    #[must_use]
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Per-facility rollup produced by [`crate::aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySummary {
    pub name: String,
    /// Set when `name` is a synthetic `Unnamed-<n>` placeholder.
    pub unnamed: bool,
    pub regular_total: u32,
    pub regular_available: u32,
    pub accessible_total: u32,
    pub accessible_available: u32,
    pub weekday_fee: Option<String>,
    pub service_hours: Option<String>,
    pub address: Option<String>,
    pub sample_coordinates: Vec<Coordinate>,
    pub distance: Option<f64>,
}

impl FacilitySummary {
    #[must_use]
    pub fn has_regular_space(&self) -> bool {
        self.regular_available > 0
    }
}
