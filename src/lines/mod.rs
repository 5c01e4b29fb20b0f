//! Polyline post-processing: clip, filter, decimate, simplify.
//!
//! Clipping uses Cohen–Sutherland per segment, which computes exact
//! boundary-crossing points. When a polyline leaves the rectangle and
//! re-enters, the output splits into separate polylines; concatenating across
//! the gap would fabricate an edge that follows the boundary, which is
//! exactly the artifact the older "drop out-of-range vertices" crop produced.

use crate::domain::{Bounds, Polyline, ProcessingConfig};
use crate::geodesy;

/// Matching tolerance for chaining clipped segments back together, degrees.
const CHAIN_EPS: f64 = 1e-9;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

/// Clip a polyline to a bounding rectangle.
///
/// Returns zero or more pieces, each fully inside the rectangle (boundary
/// inclusive). A polyline entirely outside clips to nothing.
pub fn clip_polyline(line: &[(f64, f64)], bounds: &Bounds) -> Vec<Polyline> {
    let mut pieces = Vec::new();
    let mut current: Polyline = Vec::new();

    for window in line.windows(2) {
        let Some((start, end)) = clip_segment(window[0], window[1], bounds) else {
            continue;
        };
        let chains = current
            .last()
            .is_some_and(|&tail| close(tail, start));
        if !chains {
            if current.len() >= 2 {
                pieces.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current.push(start);
        }
        current.push(end);
    }
    if current.len() >= 2 {
        pieces.push(current);
    }

    pieces
}

/// Cohen–Sutherland clip of one segment. Returns the clipped endpoints, or
/// `None` when the segment lies entirely outside.
fn clip_segment(
    p1: (f64, f64),
    p2: (f64, f64),
    bounds: &Bounds,
) -> Option<((f64, f64), (f64, f64))> {
    let (mut x1, mut y1) = p1;
    let (mut x2, mut y2) = p2;
    let mut code1 = outcode(x1, y1, bounds);
    let mut code2 = outcode(x2, y2, bounds);

    loop {
        if code1 == INSIDE && code2 == INSIDE {
            return Some(((x1, y1), (x2, y2)));
        }
        if code1 & code2 != 0 {
            return None;
        }

        let code_out = if code1 != INSIDE { code1 } else { code2 };
        let (x, y) = if code_out & TOP != 0 {
            (
                x1 + (x2 - x1) * (bounds.max_lat - y1) / (y2 - y1),
                bounds.max_lat,
            )
        } else if code_out & BOTTOM != 0 {
            (
                x1 + (x2 - x1) * (bounds.min_lat - y1) / (y2 - y1),
                bounds.min_lat,
            )
        } else if code_out & RIGHT != 0 {
            (
                bounds.max_lon,
                y1 + (y2 - y1) * (bounds.max_lon - x1) / (x2 - x1),
            )
        } else {
            (
                bounds.min_lon,
                y1 + (y2 - y1) * (bounds.min_lon - x1) / (x2 - x1),
            )
        };

        if code_out == code1 {
            x1 = x;
            y1 = y;
            code1 = outcode(x1, y1, bounds);
        } else {
            x2 = x;
            y2 = y;
            code2 = outcode(x2, y2, bounds);
        }
    }
}

fn outcode(x: f64, y: f64, bounds: &Bounds) -> u8 {
    let mut code = INSIDE;
    if x < bounds.min_lon {
        code |= LEFT;
    } else if x > bounds.max_lon {
        code |= RIGHT;
    }
    if y < bounds.min_lat {
        code |= BOTTOM;
    } else if y > bounds.max_lat {
        code |= TOP;
    }
    code
}

/// Total geodesic length of a polyline in kilometers.
pub fn geodesic_length_km(line: &[(f64, f64)]) -> f64 {
    line.windows(2)
        .map(|w| geodesy::distance_km(w[0].1, w[0].0, w[1].1, w[1].0))
        .sum()
}

/// Clip, filter, decimate, and simplify contour polylines.
///
/// Returns the surviving lines plus the count of fragments dropped by the
/// vertex/length filters (for run diagnostics).
pub fn process_lines(
    lines: Vec<Polyline>,
    bounds: &Bounds,
    config: &ProcessingConfig,
) -> (Vec<Polyline>, usize) {
    let mut kept = Vec::new();
    let mut dropped = 0usize;

    let clipped: Vec<Polyline> = if config.clip_to_bounds {
        lines
            .iter()
            .flat_map(|line| clip_polyline(line, bounds))
            .collect()
    } else {
        lines
    };

    for line in clipped {
        if line.len() < 2 || geodesic_length_km(&line) < config.min_line_length {
            dropped += 1;
            continue;
        }
        let line = decimate(line, config.max_line_segments);
        let line = simplify(line, config.simplify_tolerance);
        if line.len() < 2 {
            dropped += 1;
            continue;
        }
        kept.push(line);
    }

    (kept, dropped)
}

/// Uniform-stride decimation down to roughly `max_vertices` points.
///
/// First and last vertices always survive, so the line's extent is preserved.
fn decimate(line: Polyline, max_vertices: usize) -> Polyline {
    if max_vertices < 2 || line.len() <= max_vertices {
        return line;
    }
    let last = line.len() - 1;
    let stride = line.len().div_ceil(max_vertices);
    let mut out: Polyline = line.iter().copied().step_by(stride).collect();
    if out.last() != Some(&line[last]) {
        out.push(line[last]);
    }
    out
}

/// Drop vertices whose lon and lat deltas from the last retained vertex are
/// both below `tolerance`. The final vertex is always kept.
///
/// This is a cheap stand-in for true simplification; the contour is already
/// locally near-linear at typical lattice resolution.
fn simplify(line: Polyline, tolerance: f64) -> Polyline {
    if tolerance <= 0.0 || line.len() <= 2 {
        return line;
    }
    let mut out: Polyline = Vec::with_capacity(line.len());
    out.push(line[0]);
    for &point in &line[1..line.len() - 1] {
        let last = *out.last().unwrap();
        if (point.0 - last.0).abs() >= tolerance || (point.1 - last.1).abs() >= tolerance {
            out.push(point);
        }
    }
    out.push(line[line.len() - 1]);
    out
}

#[inline]
fn close(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < CHAIN_EPS && (a.1 - b.1).abs() < CHAIN_EPS
}
