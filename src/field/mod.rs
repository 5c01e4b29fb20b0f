//! TD field construction and correction.
//!
//! - lattice sampling and raw TD evaluation (`lattice`)
//! - GRI unwrapping + smoothing (`unwrap`)
//! - anchor-based calibration (`calibrate`)

pub mod calibrate;
pub mod lattice;
pub mod unwrap;

pub use calibrate::*;
pub use lattice::*;
pub use unwrap::*;
