//! `loran-grid` library crate.
//!
//! Computes LORAN-C hyperbolic grid lines: curves of constant time-difference
//! (TD) between a master and a secondary transmitter, rendered as polylines
//! over a geographic region for nautical chart overlays.
//!
//! The binary (`loran-grid`) is a thin wrapper around this library so that:
//!
//! - the field/contour pipeline is testable without spawning processes
//! - modules are reusable (e.g., future tile servers, chart tooling)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod contour;
pub mod domain;
pub mod error;
pub mod field;
pub mod geodesy;
pub mod grid;
pub mod io;
pub mod labels;
pub mod lines;
