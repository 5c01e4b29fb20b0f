//! TD field unwrapping.
//!
//! A TD field derived from true propagation can exhibit large local jumps when
//! intermediate quantities wrap modulo the GRI, or can simply be noisy.
//! Contouring a discontinuous field yields fragments instead of connected
//! lines, so we repair the field first:
//!
//! 1. scan each row, then each column; where the difference between adjacent
//!    cells exceeds half the GRI, treat it as a wrap artifact and subtract the
//!    nearest integer multiple of the GRI from everything after the jump
//! 2. apply one separable 1-2-1 smoothing pass
//! 3. repeat for the configured iteration count
//!
//! This is heuristic and lossy: it trades a small amount of field accuracy for
//! topological continuity of the extracted contours. Best-effort, not exact.

use crate::domain::UnwrapConfig;
use crate::field::TdField;

/// Unwrap and smooth the field in place. No-op when disabled or when the
/// iteration count is zero.
pub fn unwrap_field(field: &mut TdField, config: &UnwrapConfig) {
    if !config.enabled || config.gri <= 0.0 {
        return;
    }
    for _ in 0..config.smooth_iterations {
        unwrap_rows(field, config.gri);
        unwrap_cols(field, config.gri);
        smooth_121(field);
    }
}

fn unwrap_rows(field: &mut TdField, gri: f64) {
    for row in 0..field.rows {
        let mut carry = 0.0;
        let mut prev_raw = field.at(row, 0);
        for col in 1..field.cols {
            let raw = field.at(row, col);
            let diff = raw - prev_raw;
            if diff.abs() > gri / 2.0 {
                carry -= (diff / gri).round() * gri;
            }
            prev_raw = raw;
            field.set(row, col, raw + carry);
        }
    }
}

fn unwrap_cols(field: &mut TdField, gri: f64) {
    for col in 0..field.cols {
        let mut carry = 0.0;
        let mut prev_raw = field.at(0, col);
        for row in 1..field.rows {
            let raw = field.at(row, col);
            let diff = raw - prev_raw;
            if diff.abs() > gri / 2.0 {
                carry -= (diff / gri).round() * gri;
            }
            prev_raw = raw;
            field.set(row, col, raw + carry);
        }
    }
}

/// One separable 1-2-1 smoothing pass (horizontal, then vertical).
///
/// Edge cells clamp to themselves, so a constant field is a fixed point and a
/// linear ramp is left unchanged in its interior.
fn smooth_121(field: &mut TdField) {
    let mut scratch = field.td.clone();

    for row in 0..field.rows {
        for col in 1..field.cols - 1 {
            let sum = field.at(row, col - 1) + 2.0 * field.at(row, col) + field.at(row, col + 1);
            scratch[row * field.cols + col] = sum / 4.0;
        }
    }
    std::mem::swap(&mut field.td, &mut scratch);

    scratch.copy_from_slice(&field.td);
    for col in 0..field.cols {
        for row in 1..field.rows - 1 {
            let sum = field.at(row - 1, col) + 2.0 * field.at(row, col) + field.at(row + 1, col);
            scratch[row * field.cols + col] = sum / 4.0;
        }
    }
    std::mem::swap(&mut field.td, &mut scratch);
}
