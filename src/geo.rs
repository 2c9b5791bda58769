//! Geographic plausibility checks.
//!
//! The catalog covers one country; any coordinate outside the fixed
//! continental-plus-offshore envelope is treated as a data error and the row
//! is dropped at ingestion, regardless of which provider produced it.

use std::fmt;

/// Southern latitude bound of the valid envelope.
pub const LAT_MIN: f64 = -5.8;
/// Northern latitude bound of the valid envelope.
pub const LAT_MAX: f64 = 2.2;
/// Western longitude bound (includes the Galápagos islands).
pub const LNG_MIN: f64 = -92.5;
/// Eastern longitude bound.
pub const LNG_MAX: f64 = -74.0;

/// Whether a coordinate pair falls inside the valid envelope (closed box).
///
/// Pure and total; the sole acceptance gate for ingested rows.
pub fn in_bounds(lat: f64, lng: f64) -> bool {
    (LAT_MIN..=LAT_MAX).contains(&lat) && (LNG_MIN..=LNG_MAX).contains(&lng)
}

/// The country's four natural regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaturalRegion {
    Costa,
    Sierra,
    Oriente,
    Galapagos,
}

impl fmt::Display for NaturalRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NaturalRegion::Costa => "Costa",
            NaturalRegion::Sierra => "Sierra",
            NaturalRegion::Oriente => "Oriente",
            NaturalRegion::Galapagos => "Galápagos",
        };
        f.write_str(name)
    }
}

/// Classify a coordinate pair into its natural region.
///
/// Island longitudes are tested before the coastal threshold; coastal and
/// eastern thresholds follow, everything between is highland.
pub fn natural_region(_lat: f64, lng: f64) -> NaturalRegion {
    if lng < -89.0 {
        NaturalRegion::Galapagos
    } else if lng < -79.5 {
        NaturalRegion::Costa
    } else if lng > -78.5 {
        NaturalRegion::Oriente
    } else {
        NaturalRegion::Sierra
    }
}
