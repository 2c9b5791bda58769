//! Region-outline overlay loading.
//!
//! The overlay is consumed independently of the record pipeline: it never
//! gates ingestion, and a missing overlay is not a load failure for the
//! catalog. Two interchangeable encodings are tolerated — a compact
//! topology payload whose shared-arc geometry needs a decode step, or plain
//! direct geometry used as-is — with a fallback between two configured
//! locations (historically `provincias.json` holding the topology and
//! `provincias.geojson` holding the direct form).
//!
//! The decoder handles the quantized topology layout: integer
//! delta-encoded arcs, a `scale`/`translate` transform, arc stitching with
//! sign-complement reversal for shared borders, and conversion of the
//! payload's first object into a feature collection.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use crate::config::BoundariesConfig;
use crate::fetch;

/// A loaded overlay: always a feature collection (or whatever direct
/// geometry the source carried), plus where it came from.
pub struct BoundaryOverlay {
    /// GeoJSON value ready for a rendering layer.
    pub collection: Value,
    /// The location that supplied it.
    pub location: String,
    /// Whether a topology decode step was needed.
    pub decoded: bool,
}

impl BoundaryOverlay {
    /// Number of features, treating a bare geometry as one.
    pub fn feature_count(&self) -> usize {
        self.collection
            .get("features")
            .and_then(Value::as_array)
            .map(|f| f.len())
            .unwrap_or(1)
    }
}

/// Load the overlay from the primary location, falling back to the
/// secondary. Only both locations failing is an error.
pub async fn load_boundaries(config: &BoundariesConfig) -> Result<BoundaryOverlay> {
    match try_location(&config.primary).await {
        Ok((collection, decoded)) => Ok(BoundaryOverlay {
            collection,
            location: config.primary.clone(),
            decoded,
        }),
        Err(e) => {
            eprintln!(
                "Warning: boundary location {} failed: {:#}, trying fallback",
                config.primary, e
            );
            let (collection, decoded) = try_location(&config.fallback)
                .await
                .context("no boundary layers available")?;
            Ok(BoundaryOverlay {
                collection,
                location: config.fallback.clone(),
                decoded,
            })
        }
    }
}

async fn try_location(location: &str) -> Result<(Value, bool)> {
    let text = fetch::read_text(location).await?;
    let payload: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", location))?;

    if payload.get("type").and_then(Value::as_str) == Some("Topology") {
        let features = topology_to_features(&payload)
            .with_context(|| format!("{} is a malformed topology", location))?;
        Ok((features, true))
    } else {
        Ok((payload, false))
    }
}

/// Convert a topology payload's first object into a feature collection.
pub fn topology_to_features(topo: &Value) -> Result<Value> {
    let transform = topo.get("transform");
    let quantized = transform.is_some();
    let (scale, translate) = match transform {
        Some(t) => (pair(t.get("scale"))?, pair(t.get("translate"))?),
        None => ([1.0, 1.0], [0.0, 0.0]),
    };

    let arcs = decode_arcs(topo, scale, translate, quantized)?;

    let objects = topo
        .get("objects")
        .and_then(Value::as_object)
        .context("topology has no objects")?;
    let first = objects
        .values()
        .next()
        .context("topology object table is empty")?;

    let features = match first.get("type").and_then(Value::as_str) {
        Some("GeometryCollection") => first
            .get("geometries")
            .and_then(Value::as_array)
            .context("geometry collection has no geometries")?
            .iter()
            .map(|g| feature(g, &arcs, scale, translate, quantized))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => vec![feature(first, &arcs, scale, translate, quantized)?],
        None => bail!("topology object has no geometry type"),
    };

    Ok(json!({ "type": "FeatureCollection", "features": features }))
}

fn pair(value: Option<&Value>) -> Result<[f64; 2]> {
    let arr = value
        .and_then(Value::as_array)
        .context("transform entry is not a pair")?;
    let a = arr.first().and_then(Value::as_f64);
    let b = arr.get(1).and_then(Value::as_f64);
    match (a, b) {
        (Some(a), Some(b)) => Ok([a, b]),
        _ => bail!("transform entry is not a numeric pair"),
    }
}

/// Decode the arc table. Quantized arcs are integer deltas run through the
/// transform; unquantized arcs are absolute positions.
fn decode_arcs(
    topo: &Value,
    scale: [f64; 2],
    translate: [f64; 2],
    quantized: bool,
) -> Result<Vec<Vec<[f64; 2]>>> {
    let raw = topo
        .get("arcs")
        .and_then(Value::as_array)
        .context("topology has no arcs")?;

    let mut arcs = Vec::with_capacity(raw.len());
    for entry in raw {
        let points = entry.as_array().context("arc is not an array")?;
        let mut line = Vec::with_capacity(points.len());
        let (mut x, mut y) = (0.0f64, 0.0f64);
        for p in points {
            let (px, py) = position(p)?;
            if quantized {
                x += px;
                y += py;
                line.push([x * scale[0] + translate[0], y * scale[1] + translate[1]]);
            } else {
                line.push([px, py]);
            }
        }
        arcs.push(line);
    }
    Ok(arcs)
}

fn position(p: &Value) -> Result<(f64, f64)> {
    let arr = p.as_array().context("arc position is not an array")?;
    let x = arr.first().and_then(Value::as_f64);
    let y = arr.get(1).and_then(Value::as_f64);
    match (x, y) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => bail!("arc position is not numeric"),
    }
}

fn feature(
    obj: &Value,
    arcs: &[Vec<[f64; 2]>],
    scale: [f64; 2],
    translate: [f64; 2],
    quantized: bool,
) -> Result<Value> {
    let geometry = geometry(obj, arcs, scale, translate, quantized)?;
    let mut out = json!({
        "type": "Feature",
        "properties": obj.get("properties").cloned().unwrap_or_else(|| json!({})),
        "geometry": geometry,
    });
    if let Some(id) = obj.get("id") {
        out["id"] = id.clone();
    }
    Ok(out)
}

fn geometry(
    obj: &Value,
    arcs: &[Vec<[f64; 2]>],
    scale: [f64; 2],
    translate: [f64; 2],
    quantized: bool,
) -> Result<Value> {
    let gtype = obj
        .get("type")
        .and_then(Value::as_str)
        .context("geometry has no type")?;

    let coordinates = match gtype {
        "Point" => {
            let (x, y) = position(obj.get("coordinates").context("point has no coordinates")?)?;
            if quantized {
                json!([x * scale[0] + translate[0], y * scale[1] + translate[1]])
            } else {
                json!([x, y])
            }
        }
        "MultiPoint" => {
            let points = obj
                .get("coordinates")
                .and_then(Value::as_array)
                .context("multipoint has no coordinates")?;
            let mut out = Vec::with_capacity(points.len());
            for p in points {
                let (x, y) = position(p)?;
                if quantized {
                    out.push(json!([x * scale[0] + translate[0], y * scale[1] + translate[1]]));
                } else {
                    out.push(json!([x, y]));
                }
            }
            Value::Array(out)
        }
        "LineString" => {
            let indices = obj
                .get("arcs")
                .and_then(Value::as_array)
                .context("linestring has no arcs")?;
            Value::Array(stitch(indices, arcs)?)
        }
        "MultiLineString" => {
            let lines = obj
                .get("arcs")
                .and_then(Value::as_array)
                .context("multilinestring has no arcs")?;
            let mut out = Vec::with_capacity(lines.len());
            for line in lines {
                let indices = line.as_array().context("line is not an arc list")?;
                out.push(Value::Array(stitch(indices, arcs)?));
            }
            Value::Array(out)
        }
        "Polygon" => {
            let rings = obj
                .get("arcs")
                .and_then(Value::as_array)
                .context("polygon has no arcs")?;
            Value::Array(decode_rings(rings, arcs)?)
        }
        "MultiPolygon" => {
            let polygons = obj
                .get("arcs")
                .and_then(Value::as_array)
                .context("multipolygon has no arcs")?;
            let mut out = Vec::with_capacity(polygons.len());
            for polygon in polygons {
                let rings = polygon.as_array().context("polygon is not a ring list")?;
                out.push(Value::Array(decode_rings(rings, arcs)?));
            }
            Value::Array(out)
        }
        "GeometryCollection" => {
            let members = obj
                .get("geometries")
                .and_then(Value::as_array)
                .context("geometry collection has no geometries")?
                .iter()
                .map(|g| geometry(g, arcs, scale, translate, quantized))
                .collect::<Result<Vec<_>>>()?;
            return Ok(json!({ "type": "GeometryCollection", "geometries": members }));
        }
        other => bail!("unsupported geometry type '{}'", other),
    };

    Ok(json!({ "type": gtype, "coordinates": coordinates }))
}

fn decode_rings(rings: &[Value], arcs: &[Vec<[f64; 2]>]) -> Result<Vec<Value>> {
    rings
        .iter()
        .map(|ring| {
            let indices = ring.as_array().context("ring is not an arc list")?;
            Ok(Value::Array(stitch(indices, arcs)?))
        })
        .collect()
}

/// Concatenate arcs into one line. A negative index means the complement
/// arc traversed in reverse; consecutive arcs share a junction point, which
/// is emitted once.
fn stitch(indices: &[Value], arcs: &[Vec<[f64; 2]>]) -> Result<Vec<Value>> {
    let mut line: Vec<Value> = Vec::new();
    for idx in indices {
        let i = idx.as_i64().context("arc index is not an integer")?;
        let (arc_index, reversed) = if i >= 0 {
            (i as usize, false)
        } else {
            ((-1 - i) as usize, true)
        };
        let arc = arcs
            .get(arc_index)
            .with_context(|| format!("arc index {} out of range", i))?;

        let mut points = arc.clone();
        if reversed {
            points.reverse();
        }
        let skip = usize::from(!line.is_empty());
        for p in points.into_iter().skip(skip) {
            line.push(json!([p[0], p[1]]));
        }
    }
    Ok(line)
}

/// Run the boundaries command: load with fallback and report.
pub async fn run_boundaries(config: &BoundariesConfig) -> Result<()> {
    let overlay = load_boundaries(config).await?;
    println!("boundaries");
    println!("  location: {}", overlay.location);
    println!(
        "  encoding: {}",
        if overlay.decoded {
            "topology (decoded)"
        } else {
            "direct geometry"
        }
    );
    println!("  features: {}", overlay.feature_count());
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantized_square_topology() -> Value {
        // One closed ring, delta-encoded: quantized corners (0,0) (2000,0)
        // (2000,2000) (0,2000) back to (0,0); scale 0.001, translate (-80,-2)
        // puts it at lng [-80,-78], lat [-2,0].
        json!({
            "type": "Topology",
            "transform": { "scale": [0.001, 0.001], "translate": [-80.0, -2.0] },
            "arcs": [
                [[0, 0], [2000, 0], [0, 2000], [-2000, 0], [0, -2000]]
            ],
            "objects": {
                "provincias": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {
                            "type": "Polygon",
                            "arcs": [[0]],
                            "properties": { "DPA_DESPRO": "GUAYAS" }
                        }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_quantized_topology_decodes_to_features() {
        let fc = topology_to_features(&quantized_square_topology()).unwrap();
        assert_eq!(fc["type"], "FeatureCollection");

        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["properties"]["DPA_DESPRO"], "GUAYAS");
        assert_eq!(features[0]["geometry"]["type"], "Polygon");

        let ring = features[0]["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        let first = ring[0].as_array().unwrap();
        assert!((first[0].as_f64().unwrap() - (-80.0)).abs() < 1e-9);
        assert!((first[1].as_f64().unwrap() - (-2.0)).abs() < 1e-9);
        let second = ring[1].as_array().unwrap();
        assert!((second[0].as_f64().unwrap() - (-78.0)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_arc_index_reverses() {
        let topo = json!({
            "type": "Topology",
            "arcs": [ [[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]] ],
            "objects": {
                "line": { "type": "LineString", "arcs": [-1] }
            }
        });
        let fc = topology_to_features(&topo).unwrap();
        let coords = fc["features"][0]["geometry"]["coordinates"]
            .as_array()
            .unwrap();
        assert_eq!(coords[0], json!([2.0, 0.0]));
        assert_eq!(coords[2], json!([0.0, 0.0]));
    }

    #[test]
    fn test_stitched_arcs_share_junctions() {
        let topo = json!({
            "type": "Topology",
            "arcs": [
                [[0.0, 0.0], [1.0, 0.0]],
                [[1.0, 0.0], [1.0, 1.0]]
            ],
            "objects": {
                "line": { "type": "LineString", "arcs": [0, 1] }
            }
        });
        let fc = topology_to_features(&topo).unwrap();
        let coords = fc["features"][0]["geometry"]["coordinates"]
            .as_array()
            .unwrap();
        // The shared (1,0) junction appears once.
        assert_eq!(coords.len(), 3);
    }

    #[test]
    fn test_malformed_topology_is_an_error() {
        assert!(topology_to_features(&json!({ "type": "Topology" })).is_err());
        assert!(topology_to_features(&json!({
            "type": "Topology",
            "arcs": [],
            "objects": {}
        }))
        .is_err());
    }

    #[tokio::test]
    async fn test_direct_geometry_passes_through() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("provincias.geojson");
        std::fs::write(
            &path,
            r#"{ "type": "FeatureCollection", "features": [] }"#,
        )
        .unwrap();

        let (value, decoded) = try_location(path.to_str().unwrap()).await.unwrap();
        assert!(!decoded);
        assert_eq!(value["type"], "FeatureCollection");
    }

    #[tokio::test]
    async fn test_fallback_is_used_when_primary_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let fallback = dir.path().join("provincias.geojson");
        std::fs::write(
            &fallback,
            r#"{ "type": "FeatureCollection", "features": [{}] }"#,
        )
        .unwrap();

        let config = BoundariesConfig {
            primary: dir.path().join("missing.json").display().to_string(),
            fallback: fallback.display().to_string(),
        };
        let overlay = load_boundaries(&config).await.unwrap();
        assert_eq!(overlay.location, config.fallback);
        assert_eq!(overlay.feature_count(), 1);
    }

    #[tokio::test]
    async fn test_both_locations_failing_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = BoundariesConfig {
            primary: dir.path().join("a.json").display().to_string(),
            fallback: dir.path().join("b.json").display().to_string(),
        };
        assert!(load_boundaries(&config).await.is_err());
    }
}
