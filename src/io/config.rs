//! Configuration loading.
//!
//! The core pipeline consumes already-validated `GridConfig` structures; this
//! loader is the binary's convenience front-end for JSON files. Malformed
//! structure surfaces as a `Configuration` error before any pipeline stage
//! runs.

use std::path::Path;

use crate::domain::GridConfig;
use crate::error::GridError;

/// Load and structurally validate a `GridConfig` from a JSON file.
pub fn load_config(path: &Path) -> Result<GridConfig, GridError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| GridError::io(format!("failed to read config '{}': {e}", path.display())))?;
    parse_config(&text)
        .map_err(|e| GridError::config(format!("invalid config '{}': {e}", path.display())))
}

fn parse_config(text: &str) -> Result<GridConfig, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "chains": {
            "9960": {
                "name": "Northeast US",
                "gri": 9960,
                "master": {
                    "id": "M", "name": "Seneca",
                    "latitude": 42.714166, "longitude": -76.825833
                },
                "secondaries": {
                    "X": {
                        "id": "X", "name": "Nantucket",
                        "latitude": 41.253333, "longitude": -69.977222,
                        "emission_delay": 26969.93, "asf": 1.2
                    }
                }
            }
        },
        "regions": {
            "northeast": {
                "name": "northeast",
                "bounds": [-76.0, 39.0, -69.0, 43.0],
                "pairs": [
                    {"chain_id": "9960", "secondary_id": "X",
                     "family": "X", "orientation": "vertical"}
                ],
                "td_ranges": {
                    "9960_X": {"min_td": 25000.0, "max_td": 27000.0, "step": 100.0}
                },
                "unwrapping": {"gri": 9960.0},
                "labels": {}
            }
        }
    }"#;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.lattice.resolution, 0.027);
        assert_eq!(config.lattice.buffer_cells, 50);
        assert_eq!(config.output.coordinate_precision, 6);

        let chain = &config.chains["9960"];
        assert_eq!(chain.master.emission_delay, 0.0);
        assert_eq!(chain.secondaries["X"].asf, 1.2);

        let region = &config.regions["northeast"];
        assert_eq!(region.bounds.min_lon, -76.0);
        assert!(region.unwrapping.enabled);
        assert_eq!(region.unwrapping.smooth_iterations, 3);
        assert_eq!(region.processing.max_line_segments, 1000);
        assert_eq!(region.td_ranges["9960_X"].format, "{:05.0f}");
    }

    #[test]
    fn malformed_config_is_a_configuration_error() {
        let dir = std::env::temp_dir().join("loran-grid-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        std::fs::write(&path, "{\"chains\": 7}").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, GridError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config(Path::new("/nonexistent/grid.json")).unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
    }
}
