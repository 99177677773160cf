use std::io::Write;

use anyhow::{Context, Result};
use geo::LineString;
use serde_json::{json, Value};

use crate::shore::ShorePolygon;

fn coords_json(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

/// Feature collection with one feature per `(bin, polygon)` pair. Closed
/// rings become `Polygon` geometries, everything else `LineString`.
pub fn to_geojson(polys: &[(usize, ShorePolygon)]) -> Value {
    let features: Vec<Value> = polys.iter().map(|(bin, p)| {
        let geometry = if p.is_closed() {
            json!({ "type": "Polygon", "coordinates": [coords_json(&p.ring)] })
        } else {
            json!({ "type": "LineString", "coordinates": coords_json(&p.ring) })
        };
        json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "bin": bin,
                "level": p.level,
                "fid": p.fid,
                "interior": p.interior,
            }
        })
    }).collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Stream a feature collection to `writer`.
pub fn write_geojson<W: Write>(polys: &[(usize, ShorePolygon)], writer: W) -> Result<()> {
    serde_json::to_writer(writer, &to_geojson(polys)).context("Failed to write GeoJSON")
}
