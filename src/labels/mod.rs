//! Label formatting and placement.
//!
//! Chart overlays key off the label text byte-for-byte, so the default
//! format — a 5-digit zero-padded integer, `"{:05.0f}"` in the upstream
//! configuration dialect — is a compatibility contract, not a cosmetic
//! choice. 13797.2 renders as "13797", 5 as "00005".

use crate::domain::{GridLabel, GridLine, LabelConfig, Placement};
use crate::lines::geodesic_length_km;

/// Fallback width when the format string is absent or unrecognized.
const DEFAULT_WIDTH: usize = 5;

/// Format a TD value per a python-style `{:0N.0f}` format string.
///
/// The value is truncated toward zero and zero-padded to the width the
/// format names. Unrecognized formats fall back to width 5.
pub fn format_td(td_value: f64, format: &str) -> String {
    let width = parse_format_width(format).unwrap_or(DEFAULT_WIDTH);
    format!("{:0width$}", td_value.trunc() as i64)
}

/// Extract `N` from `{:0N.0f}`.
fn parse_format_width(format: &str) -> Option<usize> {
    let inner = format.strip_prefix("{:0")?.strip_suffix(".0f}")?;
    inner.parse().ok()
}

/// Place labels on a finished line: at most one per requested position.
///
/// Lines shorter than `min_line_length` km receive no labels at all; the
/// middle position additionally needs more than two vertices.
pub fn place_labels(line: &GridLine, config: &LabelConfig, format: &str) -> Vec<GridLabel> {
    if !config.enabled || line.coordinates.len() < 2 {
        return Vec::new();
    }
    if geodesic_length_km(&line.coordinates) < config.min_line_length {
        return Vec::new();
    }

    let text = format_td(line.td_value, format);
    let mut labels = Vec::new();
    for placement in &config.placement {
        let anchor = match placement {
            Placement::Start => line.coordinates[0],
            Placement::Middle => {
                if line.coordinates.len() <= 2 {
                    continue;
                }
                line.coordinates[line.coordinates.len() / 2]
            }
            Placement::End => *line.coordinates.last().unwrap(),
        };
        labels.push(GridLabel {
            chain_id: line.chain_id.clone(),
            secondary_id: line.secondary_id.clone(),
            family: line.family.clone(),
            td_value: line.td_value,
            label: text.clone(),
            longitude: anchor.0,
            latitude: anchor.1,
        });
    }
    labels
}
