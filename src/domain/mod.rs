//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated configuration structures (`GridConfig`, `Region`, `Chain`, ...)
//! - geographic primitives (`Bounds`, the `Polyline` alias)
//! - pipeline outputs (`GridLine`, `GridLabel`, `GridResult`, `RunStats`)

pub mod types;

pub use types::*;
