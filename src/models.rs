//! Core data models for the catalog.
//!
//! These types represent the rows and records that flow through the
//! ingestion and query pipeline.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw row produced by a provider before normalization.
///
/// Keys are whatever the source calls its columns; values are JSON so that a
/// structured-query backend's typed numbers and a tabular file's strings
/// travel the same path.
pub type RawRow = BTreeMap<String, Value>;

/// One normalized, geo-validated district entry.
///
/// Immutable once constructed; the working set is rebuilt wholesale on each
/// load, never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Latitude, parsed and validated against the country envelope.
    pub lat: f64,
    /// Longitude, parsed and validated against the country envelope.
    pub lng: f64,
    /// Top-level administrative region (may be empty).
    pub province: String,
    /// Second-level administrative region (may be empty).
    pub canton: String,
    /// Classification label; blank input canonicalizes to
    /// [`SENTINEL_CATEGORY`](crate::schema::SENTINEL_CATEGORY).
    pub category: String,
    /// All canonical source columns, verbatim after normalization, keyed by
    /// canonical field name (includes the raw coordinate strings for display).
    pub attributes: BTreeMap<String, String>,
}

impl Record {
    /// District code attribute, or `""` when the source lacked one.
    pub fn code(&self) -> &str {
        self.attribute(crate::schema::FIELD_CODE)
    }

    /// District display name attribute, or `""`.
    pub fn name(&self) -> &str {
        self.attribute(crate::schema::FIELD_NAME)
    }

    /// A single attribute by canonical field name, `""` when absent.
    pub fn attribute(&self, field: &str) -> &str {
        self.attributes.get(field).map(String::as_str).unwrap_or("")
    }

    /// The raw concatenation of the searchable fields (code, name, province,
    /// canton). Both the ranked index and the filter predicate fold this
    /// same string, so they agree on what text a record exposes to search.
    pub fn search_haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.code(),
            self.name(),
            self.province,
            self.canton
        )
    }
}
