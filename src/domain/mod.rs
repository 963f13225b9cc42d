//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed three-variable schema (`Variable`) and its aligned table (`AlignedSeries`)
//! - country presets and how their inflation series is delivered
//! - model and scenario enums plus the scenario parameter block

pub mod types;

pub use types::*;
