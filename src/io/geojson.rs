//! GeoJSON export.
//!
//! The `GridResult` becomes a FeatureCollection: one LineString feature per
//! grid line, one Point feature per label, coordinates ordered
//! `[longitude, latitude]` and rounded to the configured precision. Property
//! names and the label text are consumed verbatim by downstream chart
//! overlays, so they are part of the external contract.

use std::path::Path;

use serde_json::{Value, json};

use crate::domain::{GridResult, OutputConfig};
use crate::error::GridError;

/// Convert a grid result to a GeoJSON FeatureCollection value.
pub fn grid_result_to_geojson(result: &GridResult, output: &OutputConfig) -> Value {
    let mut features: Vec<Value> = Vec::with_capacity(result.lines.len() + result.labels.len());

    for line in &result.lines {
        let coordinates: Vec<Value> = line
            .coordinates
            .iter()
            .map(|&(lon, lat)| {
                json!([
                    round_to(lon, output.coordinate_precision),
                    round_to(lat, output.coordinate_precision)
                ])
            })
            .collect();
        features.push(json!({
            "type": "Feature",
            "properties": {
                "kind": "line",
                "family": line.family,
                "td": line.td_value,
                "chain_id": line.chain_id,
                "secondary_id": line.secondary_id,
            },
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
        }));
    }

    if output.include_labels {
        for label in &result.labels {
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "kind": "label",
                    "family": label.family,
                    "td": label.td_value,
                    "label": label.label,
                    "chain_id": label.chain_id,
                    "secondary_id": label.secondary_id,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [
                        round_to(label.longitude, output.coordinate_precision),
                        round_to(label.latitude, output.coordinate_precision)
                    ],
                },
            }));
        }
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
        "metadata": {
            "region": result.region_name,
            "bounds": result.bounds,
            "total_lines": result.lines.len(),
            "total_labels": result.labels.len(),
            "stats": result.stats,
            "generated_at": result.generated_at,
        },
    })
}

/// Write a GeoJSON value to disk, creating parent directories as needed.
pub fn write_geojson(path: &Path, value: &Value) -> Result<(), GridError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            GridError::io(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    let file = std::fs::File::create(path)
        .map_err(|e| GridError::io(format!("failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| GridError::io(format!("failed to write '{}': {e}", path.display())))
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, GridLabel, GridLine, RunStats};
    use chrono::Utc;

    fn sample_result() -> GridResult {
        GridResult {
            region_name: "northeast".into(),
            bounds: Bounds::new(-76.0, 39.0, -69.0, 43.0),
            lines: vec![GridLine {
                chain_id: "9960".into(),
                secondary_id: "X".into(),
                family: "X".into(),
                td_value: 26100.0,
                coordinates: vec![(-70.123456789, 41.5), (-70.2, 41.6)],
            }],
            labels: vec![GridLabel {
                chain_id: "9960".into(),
                secondary_id: "X".into(),
                family: "X".into(),
                td_value: 26100.0,
                label: "26100".into(),
                longitude: -70.123456789,
                latitude: 41.5,
            }],
            stats: RunStats::default(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn features_carry_contract_properties() {
        let value = grid_result_to_geojson(&sample_result(), &OutputConfig::default());
        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let line = &features[0];
        assert_eq!(line["properties"]["kind"], "line");
        assert_eq!(line["properties"]["family"], "X");
        assert_eq!(line["properties"]["td"], 26100.0);
        assert_eq!(line["geometry"]["type"], "LineString");

        let label = &features[1];
        assert_eq!(label["properties"]["kind"], "label");
        assert_eq!(label["properties"]["label"], "26100");
        assert_eq!(label["geometry"]["type"], "Point");
    }

    #[test]
    fn coordinates_are_lon_lat_and_rounded() {
        let value = grid_result_to_geojson(&sample_result(), &OutputConfig::default());
        let coords = &value["features"][0]["geometry"]["coordinates"];
        assert_eq!(coords[0][0], -70.123457); // 6 decimal places
        assert_eq!(coords[0][1], 41.5);
    }

    #[test]
    fn labels_can_be_excluded() {
        let output = OutputConfig {
            include_labels: false,
            ..OutputConfig::default()
        };
        let value = grid_result_to_geojson(&sample_result(), &output);
        assert_eq!(value["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn metadata_counts_match_content() {
        let value = grid_result_to_geojson(&sample_result(), &OutputConfig::default());
        assert_eq!(value["metadata"]["total_lines"], 1);
        assert_eq!(value["metadata"]["total_labels"], 1);
        assert_eq!(value["metadata"]["region"], "northeast");
        assert_eq!(
            value["metadata"]["bounds"],
            json!([-76.0, 39.0, -69.0, 43.0])
        );
    }
}
