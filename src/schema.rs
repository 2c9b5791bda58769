//! Canonical record schema and row normalization.
//!
//! Every provider speaks a slightly different dialect of the same table:
//! headers change casing between exports (`COD_DISTRI` vs `cod_distri`),
//! some files rename columns outright (`CODIGO`, `DISTRITO`), and
//! coordinates arrive as typed numbers or locale-formatted strings. This
//! module maps any of those shapes into the one canonical [`Record`] shape,
//! or rejects the row when its position cannot be trusted.
//!
//! Header matching is case-insensitive and whitespace/diacritic-insensitive;
//! per field, the canonical name is tried first and the aliases after it, so
//! the first candidate that resolves wins. Rejection is a filtering outcome,
//! not an error: callers count rejected rows in aggregate.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::geo;
use crate::models::{RawRow, Record};
use crate::numeric;
use crate::text::fold_key;

/// Canonical name of the district-code column.
pub const FIELD_CODE: &str = "COD_DISTRI";
/// Canonical name of the district display-name column.
pub const FIELD_NAME: &str = "NOM_DISTRI";
/// Canonical name of the top-level region (province) column.
pub const FIELD_PROVINCE: &str = "DPA_DESPRO";
/// Canonical name of the second-level region (canton) column.
pub const FIELD_CANTON: &str = "DPA_DESCAN";
/// Canonical name of the classification column.
pub const FIELD_CATEGORY: &str = "COMPLEMENT";
/// Canonical name of the latitude column.
pub const FIELD_LAT: &str = "Latitud";
/// Canonical name of the longitude column.
pub const FIELD_LNG: &str = "Longitud";

/// Label substituted for a blank classification. Participates in category
/// filtering like any other label.
pub const SENTINEL_CATEGORY: &str = "SIN ETIQUETA";

/// The fixed canonical field set every source row is mapped into.
pub const CANONICAL_FIELDS: &[&str] = &[
    FIELD_CODE,
    FIELD_NAME,
    "DIRECCION",
    "X",
    "Y",
    "DPA_PARROQ",
    "DPA_DESPAR",
    "DPA_CANTON",
    FIELD_CANTON,
    "DPA_PROVIN",
    FIELD_PROVINCE,
    "ZONA",
    "NMT_25",
    FIELD_CATEGORY,
    "Capital_Pr",
    FIELD_LNG,
    FIELD_LAT,
];

/// Known alternative column names, tried after the canonical name.
const ALIASES: &[(&str, &[&str])] = &[
    (FIELD_CODE, &["CODIGO"]),
    (FIELD_NAME, &["DISTRITO"]),
    (FIELD_LNG, &["LON", "LNG"]),
    (FIELD_LAT, &["LAT"]),
];

fn aliases_of(field: &str) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, a)| *a)
        .unwrap_or(&[])
}

/// Resolve a canonical field against a raw row.
///
/// Candidate names (canonical first, then aliases) are matched against the
/// row's keys under [`fold_key`]; the first candidate with a matching key
/// wins.
fn lookup<'a>(row: &'a RawRow, field: &str) -> Option<&'a Value> {
    let canonical = fold_key(field);
    if let Some(v) = row.iter().find(|(k, _)| fold_key(k) == canonical) {
        return Some(v.1);
    }
    for alias in aliases_of(field) {
        let wanted = fold_key(alias);
        if let Some(v) = row.iter().find(|(k, _)| fold_key(k) == wanted) {
            return Some(v.1);
        }
    }
    None
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize one raw row into a [`Record`].
///
/// Returns `None` (row rejected) when either coordinate fails to parse to a
/// finite number or the position falls outside the country envelope.
/// Unresolved optional fields become empty strings. Idempotent: a row whose
/// keys already match the canonical names normalizes to the same record.
pub fn normalize(row: &RawRow) -> Option<Record> {
    let lat = lookup(row, FIELD_LAT).and_then(numeric::parse_value)?;
    let lng = lookup(row, FIELD_LNG).and_then(numeric::parse_value)?;
    if !geo::in_bounds(lat, lng) {
        return None;
    }

    let mut attributes = BTreeMap::new();
    for field in CANONICAL_FIELDS {
        let value = lookup(row, field).map(value_to_string).unwrap_or_default();
        attributes.insert((*field).to_string(), value);
    }

    let category = match attributes.get(FIELD_CATEGORY).map(|s| s.trim()) {
        Some("") | None => SENTINEL_CATEGORY.to_string(),
        Some(label) => label.to_string(),
    };
    let province = attributes.get(FIELD_PROVINCE).cloned().unwrap_or_default();
    let canton = attributes.get(FIELD_CANTON).cloned().unwrap_or_default();

    Some(Record {
        lat,
        lng,
        province,
        canton,
        category,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_normalize_basic_row() {
        let r = normalize(&row(&[
            ("COD_DISTRI", "17D01"),
            ("NOM_DISTRI", "NANEGAL A ZAMBIZA"),
            ("DPA_DESPRO", "PICHINCHA"),
            ("DPA_DESCAN", "QUITO"),
            ("COMPLEMENT", "MINEDUC"),
            ("Latitud", "-0.1807"),
            ("Longitud", "-78.4678"),
        ]))
        .expect("row should normalize");

        assert_eq!(r.code(), "17D01");
        assert_eq!(r.province, "PICHINCHA");
        assert_eq!(r.canton, "QUITO");
        assert_eq!(r.category, "MINEDUC");
        assert!((r.lat - (-0.1807)).abs() < 1e-9);
        // Raw coordinate strings are carried for display.
        assert_eq!(r.attribute(FIELD_LAT), "-0.1807");
    }

    #[test]
    fn test_header_matching_is_loose() {
        let r = normalize(&row(&[
            (" cod_distri ", "01D01"),
            ("distrito", "CUENCA NORTE"),
            ("lat", "-2,8974"),
            ("lon", "-79,0045"),
        ]))
        .expect("aliased headers should resolve");
        assert_eq!(r.code(), "01D01");
        assert_eq!(r.name(), "CUENCA NORTE");
        assert!((r.lng - (-79.0045)).abs() < 1e-9);
    }

    #[test]
    fn test_canonical_name_preferred_over_alias() {
        let r = normalize(&row(&[
            ("CODIGO", "wrong"),
            ("COD_DISTRI", "09D04"),
            ("Latitud", "-2.17"),
            ("Longitud", "-79.92"),
        ]))
        .unwrap();
        assert_eq!(r.code(), "09D04");
    }

    #[test]
    fn test_unparseable_coordinate_rejects_row() {
        assert!(normalize(&row(&[("Latitud", "n/a"), ("Longitud", "-78.5")])).is_none());
        assert!(normalize(&row(&[("Latitud", ""), ("Longitud", "-78.5")])).is_none());
        assert!(normalize(&row(&[("Longitud", "-78.5")])).is_none());
    }

    #[test]
    fn test_out_of_bounds_rejects_row() {
        assert!(normalize(&row(&[("Latitud", "10.0"), ("Longitud", "-78.18")])).is_none());
    }

    #[test]
    fn test_blank_category_becomes_sentinel() {
        let r = normalize(&row(&[
            ("Latitud", "-1.83"),
            ("Longitud", "-78.18"),
            ("COMPLEMENT", "   "),
        ]))
        .unwrap();
        assert_eq!(r.category, SENTINEL_CATEGORY);

        let r = normalize(&row(&[("Latitud", "-1.83"), ("Longitud", "-78.18")])).unwrap();
        assert_eq!(r.category, SENTINEL_CATEGORY);
    }

    #[test]
    fn test_unresolved_fields_become_empty() {
        let r = normalize(&row(&[("Latitud", "-1.83"), ("Longitud", "-78.18")])).unwrap();
        assert_eq!(r.attribute("DIRECCION"), "");
        assert_eq!(r.attributes.len(), CANONICAL_FIELDS.len());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let first = normalize(&row(&[
            ("codigo", "23D02"),
            ("DISTRITO", "SANTO DOMINGO"),
            ("DPA_DESPRO", "SANTO DOMINGO DE LOS TSÁCHILAS"),
            ("Latitud", "-0,2389"),
            ("Longitud", "-79,1774"),
        ]))
        .unwrap();

        let replay: RawRow = first
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let second = normalize(&replay).unwrap();

        assert_eq!(second.attributes, first.attributes);
        assert_eq!(second.category, first.category);
        assert_eq!(second.province, first.province);
        assert!((second.lat - first.lat).abs() < 1e-12);
        assert!((second.lng - first.lng).abs() < 1e-12);
    }
}
