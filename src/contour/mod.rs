//! Iso-line extraction via marching squares.
//!
//! For a target TD value, each lattice cell is classified by which of its
//! four corners sit above the target; the 16 cases map to zero, one, or two
//! line segments whose endpoints are linearly interpolated along the cell
//! edges. The unordered segments are then joined end-to-end into polylines.
//!
//! Adjacent cells interpolate a shared edge from the same two corner values,
//! so matching endpoints compare equal and joining needs only a tiny epsilon.
//!
//! A field that never reaches the target yields no segments and therefore an
//! empty result; that is expected, not an error. Disjoint branches (the two
//! arms of a hyperbola, for instance) come out as separate polylines and are
//! never merged.

use crate::domain::Polyline;
use crate::field::TdField;

/// Endpoint-matching tolerance in degrees.
const JOIN_EPS: f64 = 1e-9;

type Segment = ((f64, f64), (f64, f64));

/// Extract all polylines along which the field equals `td_value`.
///
/// Output coordinates are `(longitude, latitude)`.
pub fn extract_contours(field: &TdField, td_value: f64) -> Vec<Polyline> {
    let segments = march_squares(field, td_value);
    connect_segments(segments)
}

fn march_squares(field: &TdField, level: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    if field.rows < 2 || field.cols < 2 {
        return segments;
    }

    for row in 0..field.rows - 1 {
        for col in 0..field.cols - 1 {
            // Corner naming follows the lattice: `b` = this row, `t` = next
            // row (greater latitude), `l`/`r` = this/next column.
            let bl = field.at(row, col);
            let br = field.at(row, col + 1);
            let tl = field.at(row + 1, col);
            let tr = field.at(row + 1, col + 1);

            if !(bl.is_finite() && br.is_finite() && tl.is_finite() && tr.is_finite()) {
                continue;
            }

            let mut case = 0u8;
            if bl >= level {
                case |= 1;
            }
            if br >= level {
                case |= 2;
            }
            if tr >= level {
                case |= 4;
            }
            if tl >= level {
                case |= 8;
            }

            let x0 = field.lon[col];
            let x1 = field.lon[col + 1];
            let y0 = field.lat[row];
            let y1 = field.lat[row + 1];

            let bottom = || interpolate((x0, y0), (x1, y0), bl, br, level);
            let top = || interpolate((x0, y1), (x1, y1), tl, tr, level);
            let left = || interpolate((x0, y0), (x0, y1), bl, tl, level);
            let right = || interpolate((x1, y0), (x1, y1), br, tr, level);

            match case {
                0 | 15 => {}
                1 | 14 => segments.push((left(), bottom())),
                2 | 13 => segments.push((bottom(), right())),
                3 | 12 => segments.push((left(), right())),
                4 | 11 => segments.push((right(), top())),
                6 | 9 => segments.push((bottom(), top())),
                7 | 8 => segments.push((left(), top())),
                // Saddle cells: two independent segments.
                5 => {
                    segments.push((left(), bottom()));
                    segments.push((right(), top()));
                }
                10 => {
                    segments.push((left(), top()));
                    segments.push((bottom(), right()));
                }
                _ => unreachable!(),
            }
        }
    }

    segments
}

/// Where `level` crosses the edge between two corners, linearly interpolated.
fn interpolate(p1: (f64, f64), p2: (f64, f64), v1: f64, v2: f64, level: f64) -> (f64, f64) {
    if (v2 - v1).abs() < f64::EPSILON {
        return ((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0);
    }
    let t = ((level - v1) / (v2 - v1)).clamp(0.0, 1.0);
    (p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1))
}

/// Join unordered segments into polylines by endpoint matching.
///
/// Each polyline is grown at the tail and then at the head until no segment
/// attaches, so an open contour is produced as one piece regardless of which
/// of its segments seeded the chain.
fn connect_segments(segments: Vec<Segment>) -> Vec<Polyline> {
    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut points: Vec<(f64, f64)> = vec![segments[seed].0, segments[seed].1];

        loop {
            let tail = *points.last().unwrap();
            match take_adjacent(&segments, &mut used, tail) {
                Some(next) => points.push(next),
                None => break,
            }
        }
        loop {
            let head = points[0];
            match take_adjacent(&segments, &mut used, head) {
                Some(next) => points.insert(0, next),
                None => break,
            }
        }

        polylines.push(points);
    }

    polylines
}

/// Find an unused segment with an endpoint at `point`, mark it used, and
/// return its far endpoint.
fn take_adjacent(segments: &[Segment], used: &mut [bool], point: (f64, f64)) -> Option<(f64, f64)> {
    for (i, seg) in segments.iter().enumerate() {
        if used[i] {
            continue;
        }
        if close(seg.0, point) {
            used[i] = true;
            return Some(seg.1);
        }
        if close(seg.1, point) {
            used[i] = true;
            return Some(seg.0);
        }
    }
    None
}

#[inline]
fn close(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < JOIN_EPS && (a.1 - b.1).abs() < JOIN_EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Field whose value is just the longitude, scaled.
    fn lon_ramp_field(rows: usize, cols: usize, scale: f64) -> TdField {
        let mut td = Vec::with_capacity(rows * cols);
        for _ in 0..rows {
            for col in 0..cols {
                td.push(col as f64 * scale);
            }
        }
        TdField {
            rows,
            cols,
            td,
            lat: (0..rows).map(|i| i as f64).collect(),
            lon: (0..cols).map(|i| i as f64).collect(),
        }
    }

    #[test]
    fn vertical_ramp_yields_single_straight_contour() {
        let field = lon_ramp_field(4, 6, 100.0);
        let contours = extract_contours(&field, 250.0);
        assert_eq!(contours.len(), 1);
        let line = &contours[0];
        // The 250 level sits at lon 2.5, spanning the full lat range.
        assert_eq!(line.len(), 4);
        for &(lon, _) in line {
            assert!((lon - 2.5).abs() < 1e-9, "got lon {lon}");
        }
        let lats: Vec<f64> = line.iter().map(|p| p.1).collect();
        assert!((lats[0] - lats[lats.len() - 1]).abs() > 2.9);
    }

    #[test]
    fn level_outside_field_range_yields_nothing() {
        let field = lon_ramp_field(4, 6, 100.0);
        assert!(extract_contours(&field, 999_999.0).is_empty());
        assert!(extract_contours(&field, -1.0).is_empty());
    }

    #[test]
    fn disjoint_branches_stay_disjoint() {
        // V-shaped field |lon - 2.5|: the level 1.5 crosses at lon 1 and 4.
        let rows = 4;
        let cols = 6;
        let mut td = Vec::new();
        for _ in 0..rows {
            for col in 0..cols {
                td.push((col as f64 - 2.5).abs());
            }
        }
        let field = TdField {
            rows,
            cols,
            td,
            lat: (0..rows).map(|i| i as f64).collect(),
            lon: (0..cols).map(|i| i as f64).collect(),
        };
        let contours = extract_contours(&field, 1.5);
        assert_eq!(contours.len(), 2, "expected two branches");
        for line in &contours {
            assert!(line.len() >= 2);
            let lon = line[0].0;
            assert!((lon - 1.0).abs() < 1e-9 || (lon - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn interpolation_is_proportional() {
        let p = interpolate((0.0, 0.0), (1.0, 0.0), 10.0, 30.0, 15.0);
        assert!((p.0 - 0.25).abs() < 1e-12);
        assert_eq!(p.1, 0.0);
    }
}
