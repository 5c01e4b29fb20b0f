//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - loaded from JSON configuration files
//! - used in-memory during field construction and contouring
//! - exported to GeoJSON

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered run of `(longitude, latitude)` vertices.
pub type Polyline = Vec<(f64, f64)>;

/// A LORAN-C transmitter site.
///
/// Master stations carry `emission_delay = coding_delay = 0` by convention;
/// the delays are meaningful only on secondaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Emission delay in microseconds.
    #[serde(default)]
    pub emission_delay: f64,
    /// Coding delay in microseconds.
    #[serde(default)]
    pub coding_delay: f64,
}

/// A secondary station: a `Station` plus its empirical ASF correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secondary {
    #[serde(flatten)]
    pub station: Station,
    /// Additional Secondary Factor correction in microseconds, applied as a
    /// constant additive term to every raw TD of this pair.
    #[serde(default)]
    pub asf: f64,
}

/// A LORAN-C chain: one master plus its secondaries, pulsing at a common GRI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    /// Group Repetition Interval in microseconds.
    pub gri: u32,
    pub master: Station,
    pub secondaries: BTreeMap<String, Secondary>,
}

/// Line orientation hint, carried through to chart styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// One master/secondary pairing to render in a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationPair {
    /// Chain identifier (e.g., "9960").
    pub chain_id: String,
    pub secondary_id: String,
    /// Family tag grouping lines from the same secondary (W, X, Y, Z).
    pub family: String,
    pub orientation: Orientation,
}

impl StationPair {
    /// Key used in `td_ranges` maps and calibration anchors.
    pub fn pair_id(&self) -> String {
        format!("{}_{}", self.chain_id, self.secondary_id)
    }
}

/// Range of TD values to contour for one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdRange {
    /// Minimum TD value in microseconds.
    pub min_td: f64,
    /// Maximum TD value in microseconds.
    pub max_td: f64,
    /// Step size in microseconds.
    #[serde(default = "default_td_step")]
    pub step: f64,
    /// Label format string, python-style (`"{:05.0f}"` is the chart default).
    #[serde(default = "default_td_format")]
    pub format: String,
    /// Canonical TD values always emitted when inside `[min_td, max_td]`,
    /// even if they fall off the step lattice.
    #[serde(default)]
    pub include: Vec<f64>,
}

fn default_td_step() -> f64 {
    50.0
}

fn default_td_format() -> String {
    "{:05.0f}".to_string()
}

/// A point with empirically known TD values, used to correct systemic bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationAnchor {
    pub latitude: f64,
    pub longitude: f64,
    /// Expected TD per pair id at this location.
    pub td_values: BTreeMap<String, f64>,
}

/// TD field unwrapping parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnwrapConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// GRI in microseconds; jumps larger than half of this are treated as
    /// wrap artifacts.
    pub gri: f64,
    #[serde(default = "default_smooth_iterations")]
    pub smooth_iterations: usize,
}

fn default_smooth_iterations() -> usize {
    3
}

fn default_true() -> bool {
    true
}

/// Where along a line labels may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Start,
    Middle,
    End,
}

/// Label placement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_placement")]
    pub placement: Vec<Placement>,
    /// Minimum geodesic line length (km) for the line to receive any label.
    #[serde(default = "default_label_min_length")]
    pub min_line_length: f64,
}

fn default_placement() -> Vec<Placement> {
    vec![Placement::Start, Placement::Middle, Placement::End]
}

fn default_label_min_length() -> f64 {
    5.0
}

/// Post-contour line processing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default = "default_true")]
    pub clip_to_bounds: bool,
    /// Minimum geodesic length (km) for a clipped line to be kept.
    #[serde(default = "default_min_line_length")]
    pub min_line_length: f64,
    /// Maximum vertices per line; longer lines are decimated.
    #[serde(default = "default_max_line_segments")]
    pub max_line_segments: usize,
    /// Coordinate-delta tolerance (degrees) for vertex dropping.
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            clip_to_bounds: true,
            min_line_length: default_min_line_length(),
            max_line_segments: default_max_line_segments(),
            simplify_tolerance: default_simplify_tolerance(),
        }
    }
}

fn default_min_line_length() -> f64 {
    2.0
}

fn default_max_line_segments() -> usize {
    1000
}

fn default_simplify_tolerance() -> f64 {
    0.001
}

/// Sampling lattice parameters.
///
/// `buffer_cells` extends the lattice beyond the region bounds on every side
/// so contours are not truncated at the lattice edge before clipping. The
/// buffer must exceed anything smoothing consumes; the default matches the
/// charts this grid is calibrated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Cell size in decimal degrees.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    #[serde(default = "default_buffer_cells")]
    pub buffer_cells: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            buffer_cells: default_buffer_cells(),
        }
    }
}

fn default_resolution() -> f64 {
    0.027
}

fn default_buffer_cells() -> usize {
    50
}

/// A geographic bounding rectangle.
///
/// Serialized as `[min_lon, min_lat, max_lon, max_lat]` to match chart
/// configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// True when the rectangle encloses a nonzero area.
    pub fn has_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Inclusive containment test for a `(lon, lat)` point.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// The rectangle grown by `margin` degrees on every side.
    pub fn buffered(&self, margin: f64) -> Self {
        Self {
            min_lon: self.min_lon - margin,
            min_lat: self.min_lat - margin,
            max_lon: self.max_lon + margin,
            max_lat: self.max_lat + margin,
        }
    }
}

impl From<[f64; 4]> for Bounds {
    fn from(b: [f64; 4]) -> Self {
        Bounds::new(b[0], b[1], b[2], b[3])
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.min_lon, b.min_lat, b.max_lon, b.max_lat]
    }
}

/// A region to render: bounds, pairs, and per-pair/per-stage parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub bounds: Bounds,
    pub pairs: Vec<StationPair>,
    /// TD range per pair id.
    pub td_ranges: BTreeMap<String, TdRange>,
    #[serde(default)]
    pub calibration_anchors: Vec<CalibrationAnchor>,
    pub unwrapping: UnwrapConfig,
    pub labels: LabelConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Output shaping for the GeoJSON writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_precision")]
    pub coordinate_precision: u32,
    #[serde(default = "default_true")]
    pub include_labels: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            coordinate_precision: default_precision(),
            include_labels: true,
        }
    }
}

fn default_precision() -> u32 {
    6
}

/// Root configuration: chains, regions, and global knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub lattice: LatticeConfig,
    pub chains: BTreeMap<String, Chain>,
    pub regions: BTreeMap<String, Region>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// A finished hyperbolic grid line at one constant TD value.
///
/// Immutable once built; owned by the run's `GridResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridLine {
    pub chain_id: String,
    pub secondary_id: String,
    pub family: String,
    pub td_value: f64,
    /// `(longitude, latitude)` vertices.
    pub coordinates: Polyline,
}

/// A rendered label for a grid line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridLabel {
    pub chain_id: String,
    pub secondary_id: String,
    pub family: String,
    pub td_value: f64,
    pub label: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Counts of skipped/omitted work, kept for diagnosability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub pairs_processed: usize,
    /// Pairs skipped for degenerate geometry.
    pub pairs_skipped: usize,
    /// TD values whose contour was empty or clipped/filtered to nothing.
    pub empty_td_values: usize,
    /// Clipped fragments dropped by the length filter.
    pub lines_dropped: usize,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.pairs_processed += other.pairs_processed;
        self.pairs_skipped += other.pairs_skipped;
        self.empty_td_values += other.empty_td_values;
        self.lines_dropped += other.lines_dropped;
    }
}

/// The sole externally visible output of a grid-generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridResult {
    pub region_name: String,
    pub bounds: Bounds,
    pub lines: Vec<GridLine>,
    pub labels: Vec<GridLabel>,
    pub stats: RunStats,
    pub generated_at: DateTime<Utc>,
}
