//! TD field lattice construction.
//!
//! The field is a row-major lattice of raw TD values sampled over the region
//! bounds extended by a configurable buffer. The buffer keeps contour lines
//! from being truncated at the lattice edge before clipping, and must exceed
//! whatever the unwrapping/smoothing passes consume at the margins.
//!
//! Building the field is the dominant cost of the whole pipeline: two
//! geodesic evaluations per cell, O(rows × cols) total.

use crate::domain::{Bounds, Chain, LatticeConfig, Secondary};
use crate::error::GridError;
use crate::geodesy::{self, SPEED_OF_LIGHT_KM_PER_US};

/// A sampled TD field and its coordinate axes.
///
/// `td[row * cols + col]` is the TD at `(lat[row], lon[col])`; both axes are
/// ascending and evenly spaced.
#[derive(Debug, Clone)]
pub struct TdField {
    pub rows: usize,
    pub cols: usize,
    pub td: Vec<f64>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl TdField {
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.td[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.td[row * self.cols + col] = value;
    }

    /// Build the raw TD field for one master/secondary pair.
    ///
    /// Per cell: `td = emission_delay + (d_secondary - d_master) / c + asf`
    /// with distances in km and `c` in km/µs.
    pub fn build(
        chain: &Chain,
        secondary: &Secondary,
        bounds: &Bounds,
        lattice: &LatticeConfig,
    ) -> Result<TdField, GridError> {
        let master = &chain.master;
        let station = &secondary.station;

        // Zero baseline means the hyperbolic family is undefined.
        geodesy::baseline_km(
            master.latitude,
            master.longitude,
            station.latitude,
            station.longitude,
        )?;

        if lattice.resolution <= 0.0 {
            return Err(GridError::config(format!(
                "lattice resolution must be > 0, got {}",
                lattice.resolution
            )));
        }

        let buffered = bounds.buffered(lattice.buffer_cells as f64 * lattice.resolution);
        let lon = axis(buffered.min_lon, buffered.max_lon, lattice.resolution);
        let lat = axis(buffered.min_lat, buffered.max_lat, lattice.resolution);
        let (rows, cols) = (lat.len(), lon.len());

        let mut td = Vec::with_capacity(rows * cols);
        for &cell_lat in &lat {
            for &cell_lon in &lon {
                let d_master =
                    geodesy::distance_km(cell_lat, cell_lon, master.latitude, master.longitude);
                let d_secondary =
                    geodesy::distance_km(cell_lat, cell_lon, station.latitude, station.longitude);
                let propagation = (d_secondary - d_master) / SPEED_OF_LIGHT_KM_PER_US;
                td.push(station.emission_delay + propagation + secondary.asf);
            }
        }

        Ok(TdField {
            rows,
            cols,
            td,
            lat,
            lon,
        })
    }
}

/// Evenly spaced samples from `min` to at least `max`, step `resolution`.
fn axis(min: f64, max: f64, resolution: f64) -> Vec<f64> {
    let steps = ((max - min) / resolution).ceil() as usize;
    (0..=steps).map(|i| min + i as f64 * resolution).collect()
}
