//! Anchor-based field calibration.
//!
//! Absolute TD accuracy depends on atmospheric and ground-conductivity
//! effects outside the propagation model. Calibration lets empirically known
//! truth values correct that systemic bias: for every anchor that quotes a TD
//! for this pair, measure the field at the nearest lattice cell, average the
//! `expected - measured` offsets, and shift the whole field by the mean.
//!
//! Nearest-cell lookup is Euclidean in degree space; sub-cell interpolation
//! buys nothing at calibration-grade accuracy.

use crate::domain::CalibrationAnchor;
use crate::field::TdField;

/// Shift the field by the mean anchor offset for `pair_id`.
///
/// Returns the applied offset, or `None` when no anchor quotes this pair.
pub fn calibrate_field(
    field: &mut TdField,
    anchors: &[CalibrationAnchor],
    pair_id: &str,
) -> Option<f64> {
    let offsets: Vec<f64> = anchors
        .iter()
        .filter_map(|anchor| {
            let expected = *anchor.td_values.get(pair_id)?;
            let (row, col) = nearest_cell(field, anchor.latitude, anchor.longitude);
            Some(expected - field.at(row, col))
        })
        .collect();

    if offsets.is_empty() {
        return None;
    }

    let mean = offsets.iter().sum::<f64>() / offsets.len() as f64;
    for value in &mut field.td {
        *value += mean;
    }
    Some(mean)
}

/// Nearest lattice cell to `(lat, lon)`.
///
/// The axes are evenly spaced, so the per-axis nearest index is also the
/// Euclidean nearest cell.
fn nearest_cell(field: &TdField, lat: f64, lon: f64) -> (usize, usize) {
    (
        nearest_index(&field.lat, lat),
        nearest_index(&field.lon, lon),
    )
}

fn nearest_index(axis: &[f64], value: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &v) in axis.iter().enumerate() {
        let dist = (v - value).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}
