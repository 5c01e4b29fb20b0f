//! Grid orchestration.
//!
//! For each station pair in a region the field is built, unwrapped, and
//! calibrated once, then every TD value in the pair's range is contoured,
//! clipped, and labeled. Pairs are independent — each one reads only shared
//! configuration and writes only its own output — so they run in parallel
//! and their results are merged after the join.
//!
//! Failure policy: configuration resolution happens up front and is fatal
//! for the run; degenerate pair geometry skips that pair only; a TD value
//! with no surviving line is counted and omitted.

use chrono::Utc;
use rayon::prelude::*;

use crate::domain::{
    Chain, GridConfig, GridLabel, GridLine, GridResult, Region, RunStats, Secondary, StationPair,
    TdRange,
};
use crate::error::GridError;
use crate::contour::extract_contours;
use crate::field::{TdField, calibrate_field, unwrap_field};
use crate::labels::place_labels;
use crate::lines::process_lines;

/// A station pair with every configuration reference resolved.
struct ResolvedPair<'a> {
    pair: &'a StationPair,
    chain: &'a Chain,
    secondary: &'a Secondary,
    range: &'a TdRange,
}

/// One pair's share of the final result.
struct PairOutput {
    lines: Vec<GridLine>,
    labels: Vec<GridLabel>,
    stats: RunStats,
}

/// Generate the full grid for one configured region.
pub fn generate_region_grid(config: &GridConfig, region_name: &str) -> Result<GridResult, GridError> {
    let region = config
        .regions
        .get(region_name)
        .ok_or_else(|| GridError::config(format!("region '{region_name}' not found")))?;

    if !region.bounds.has_area() {
        return Err(GridError::degenerate(format!(
            "region '{region_name}' has zero-area bounds"
        )));
    }

    // Resolve every reference before any field work begins.
    let resolved = resolve_pairs(config, region)?;

    let outputs: Vec<Result<PairOutput, GridError>> = resolved
        .par_iter()
        .map(|pair| run_pair(config, region, pair))
        .collect();

    let mut lines = Vec::new();
    let mut labels = Vec::new();
    let mut stats = RunStats::default();
    for output in outputs {
        match output {
            Ok(out) => {
                stats.merge(&out.stats);
                lines.extend(out.lines);
                labels.extend(out.labels);
            }
            // Pair-scoped: siblings already ran, just record the skip.
            Err(GridError::DegenerateGeometry(_)) => stats.pairs_skipped += 1,
            Err(other) => return Err(other),
        }
    }

    Ok(GridResult {
        region_name: region.name.clone(),
        bounds: region.bounds,
        lines,
        labels,
        stats,
        generated_at: Utc::now(),
    })
}

fn resolve_pairs<'a>(
    config: &'a GridConfig,
    region: &'a Region,
) -> Result<Vec<ResolvedPair<'a>>, GridError> {
    region
        .pairs
        .iter()
        .map(|pair| {
            let chain = config.chains.get(&pair.chain_id).ok_or_else(|| {
                GridError::config(format!("pair {}: chain '{}' not defined", pair.pair_id(), pair.chain_id))
            })?;
            let secondary = chain.secondaries.get(&pair.secondary_id).ok_or_else(|| {
                GridError::config(format!(
                    "pair {}: secondary '{}' not in chain '{}'",
                    pair.pair_id(),
                    pair.secondary_id,
                    pair.chain_id
                ))
            })?;
            let range = region.td_ranges.get(&pair.pair_id()).ok_or_else(|| {
                GridError::config(format!("pair {}: no TD range configured", pair.pair_id()))
            })?;
            if range.min_td > range.max_td {
                return Err(GridError::config(format!(
                    "pair {}: TD range min {} exceeds max {}",
                    pair.pair_id(),
                    range.min_td,
                    range.max_td
                )));
            }
            if range.step <= 0.0 {
                return Err(GridError::config(format!(
                    "pair {}: TD step must be > 0, got {}",
                    pair.pair_id(),
                    range.step
                )));
            }
            Ok(ResolvedPair {
                pair,
                chain,
                secondary,
                range,
            })
        })
        .collect()
}

/// Build → unwrap → calibrate once, then contour every TD value.
fn run_pair(
    config: &GridConfig,
    region: &Region,
    resolved: &ResolvedPair<'_>,
) -> Result<PairOutput, GridError> {
    let pair = resolved.pair;
    let pair_id = pair.pair_id();

    let mut field = TdField::build(
        resolved.chain,
        resolved.secondary,
        &region.bounds,
        &config.lattice,
    )?;
    unwrap_field(&mut field, &region.unwrapping);
    let _offset = calibrate_field(&mut field, &region.calibration_anchors, &pair_id);

    let mut stats = RunStats {
        pairs_processed: 1,
        ..RunStats::default()
    };
    let mut lines = Vec::new();
    let mut labels = Vec::new();

    for td_value in td_values(resolved.range) {
        let contours = extract_contours(&field, td_value);
        let (kept, dropped) = process_lines(contours, &region.bounds, &region.processing);
        stats.lines_dropped += dropped;
        if kept.is_empty() {
            stats.empty_td_values += 1;
            continue;
        }
        for coordinates in kept {
            let line = GridLine {
                chain_id: pair.chain_id.clone(),
                secondary_id: pair.secondary_id.clone(),
                family: pair.family.clone(),
                td_value,
                coordinates,
            };
            labels.extend(place_labels(&line, &region.labels, &resolved.range.format));
            lines.push(line);
        }
    }

    Ok(PairOutput {
        lines,
        labels,
        stats,
    })
}

/// TD values for a range: `min..=max` by `step`, plus any in-range canonical
/// values off the step lattice, sorted and deduplicated.
pub fn td_values(range: &TdRange) -> Vec<f64> {
    // Step tolerance guards against fp drift excluding the max endpoint.
    let eps = range.step * 1e-9;
    let mut values = Vec::new();
    let mut i = 0u64;
    loop {
        let v = range.min_td + i as f64 * range.step;
        if v > range.max_td + eps {
            break;
        }
        values.push(v);
        i += 1;
    }

    for &canonical in &range.include {
        let in_range = canonical >= range.min_td - eps && canonical <= range.max_td + eps;
        if in_range && !values.iter().any(|&v| (v - canonical).abs() <= eps) {
            values.push(canonical);
        }
    }

    values.sort_by(f64::total_cmp);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Bounds, LabelConfig, LatticeConfig, Orientation, Placement, ProcessingConfig, Station,
        UnwrapConfig,
    };
    use std::collections::BTreeMap;

    fn range(min_td: f64, max_td: f64, step: f64) -> TdRange {
        TdRange {
            min_td,
            max_td,
            step,
            format: "{:05.0f}".into(),
            include: Vec::new(),
        }
    }

    #[test]
    fn stepping_is_inclusive_of_both_ends() {
        assert_eq!(td_values(&range(0.0, 1000.0, 500.0)), vec![0.0, 500.0, 1000.0]);
        assert_eq!(td_values(&range(100.0, 100.0, 50.0)), vec![100.0]);
    }

    #[test]
    fn canonical_values_injected_when_in_range() {
        let mut r = range(0.0, 1000.0, 400.0);
        r.include = vec![650.0, 400.0, 5000.0];
        // 650 is off-lattice and in range; 400 is already present; 5000 is out.
        assert_eq!(td_values(&r), vec![0.0, 400.0, 650.0, 800.0]);
    }

    /// Two-station chain on the equator: master at (0, 0), secondary at
    /// (0, 1) degrees, no delays.
    fn equatorial_config() -> GridConfig {
        let master = Station {
            id: "M".into(),
            name: "Master".into(),
            latitude: 0.0,
            longitude: 0.0,
            emission_delay: 0.0,
            coding_delay: 0.0,
        };
        let secondary = Secondary {
            station: Station {
                id: "X".into(),
                name: "Xray".into(),
                latitude: 0.0,
                longitude: 1.0,
                emission_delay: 0.0,
                coding_delay: 0.0,
            },
            asf: 0.0,
        };
        let mut secondaries = BTreeMap::new();
        secondaries.insert("X".to_string(), secondary);
        let chain = Chain {
            name: "test".into(),
            gri: 9960,
            master,
            secondaries,
        };

        let pair = StationPair {
            chain_id: "9960".into(),
            secondary_id: "X".into(),
            family: "X".into(),
            orientation: Orientation::Vertical,
        };
        let mut td_ranges = BTreeMap::new();
        td_ranges.insert("9960_X".to_string(), range(0.0, 1000.0, 500.0));

        let region = Region {
            name: "equator".into(),
            display_name: "Equator test".into(),
            bounds: Bounds::new(-1.0, -1.0, 1.0, 2.0),
            pairs: vec![pair],
            td_ranges,
            calibration_anchors: Vec::new(),
            unwrapping: UnwrapConfig {
                enabled: false,
                gri: 9960.0,
                smooth_iterations: 0,
            },
            labels: LabelConfig {
                enabled: true,
                placement: vec![Placement::Middle],
                min_line_length: 5.0,
            },
            processing: ProcessingConfig::default(),
        };

        let mut chains = BTreeMap::new();
        chains.insert("9960".to_string(), chain);
        let mut regions = BTreeMap::new();
        regions.insert("equator".to_string(), region);

        GridConfig {
            lattice: LatticeConfig {
                resolution: 0.1,
                buffer_cells: 5,
            },
            chains,
            regions,
            output: Default::default(),
        }
    }

    #[test]
    fn td_zero_contour_follows_perpendicular_bisector() {
        let config = equatorial_config();
        let result = generate_region_grid(&config, "equator").unwrap();

        let zero_lines: Vec<&GridLine> = result
            .lines
            .iter()
            .filter(|l| l.td_value == 0.0)
            .collect();
        assert!(!zero_lines.is_empty(), "no TD=0 line found");

        // Equidistance locus between (0, 0) and (0, 1) is the lon 0.5
        // meridian; allow a couple of lattice cells of slack.
        for line in zero_lines {
            for &(lon, lat) in &line.coordinates {
                assert!((lon - 0.5).abs() < 0.25, "vertex at lon {lon}");
                assert!(result.bounds.contains(lon, lat));
            }
        }
        assert_eq!(result.stats.pairs_processed, 1);
        assert_eq!(result.stats.pairs_skipped, 0);
    }

    #[test]
    fn labels_ride_along_with_lines() {
        let config = equatorial_config();
        let result = generate_region_grid(&config, "equator").unwrap();
        assert!(!result.labels.is_empty());
        for label in &result.labels {
            assert_eq!(label.label.len(), 5);
            assert!(result.bounds.contains(label.longitude, label.latitude));
        }
    }

    #[test]
    fn unreachable_td_is_omitted_not_an_error() {
        let mut config = equatorial_config();
        let region = config.regions.get_mut("equator").unwrap();
        region
            .td_ranges
            .insert("9960_X".to_string(), range(999_999.0, 999_999.0, 50.0));

        let result = generate_region_grid(&config, "equator").unwrap();
        assert!(result.lines.is_empty());
        assert!(result.labels.is_empty());
        assert_eq!(result.stats.empty_td_values, 1);
    }

    #[test]
    fn unknown_region_is_a_configuration_error() {
        let config = equatorial_config();
        let err = generate_region_grid(&config, "atlantis").unwrap_err();
        assert!(matches!(err, GridError::Configuration(_)));
    }

    #[test]
    fn unknown_secondary_is_fatal_before_any_field_work() {
        let mut config = equatorial_config();
        config.regions.get_mut("equator").unwrap().pairs[0].secondary_id = "Z".into();
        let err = generate_region_grid(&config, "equator").unwrap_err();
        assert!(matches!(err, GridError::Configuration(_)));
    }

    #[test]
    fn missing_td_range_is_a_configuration_error() {
        let mut config = equatorial_config();
        config
            .regions
            .get_mut("equator")
            .unwrap()
            .td_ranges
            .clear();
        let err = generate_region_grid(&config, "equator").unwrap_err();
        assert!(matches!(err, GridError::Configuration(_)));
    }

    #[test]
    fn zero_area_region_is_degenerate() {
        let mut config = equatorial_config();
        config.regions.get_mut("equator").unwrap().bounds = Bounds::new(0.0, 0.0, 0.0, 1.0);
        let err = generate_region_grid(&config, "equator").unwrap_err();
        assert!(matches!(err, GridError::DegenerateGeometry(_)));
    }

    #[test]
    fn coincident_pair_is_skipped_not_fatal() {
        let mut config = equatorial_config();
        // Move the secondary onto the master: the pair is degenerate, the
        // run itself still succeeds with a recorded skip.
        let chain = config.chains.get_mut("9960").unwrap();
        let secondary = chain.secondaries.get_mut("X").unwrap();
        secondary.station.latitude = 0.0;
        secondary.station.longitude = 0.0;

        let result = generate_region_grid(&config, "equator").unwrap();
        assert!(result.lines.is_empty());
        assert_eq!(result.stats.pairs_skipped, 1);
        assert_eq!(result.stats.pairs_processed, 0);
    }
}
