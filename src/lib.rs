//! `inflation-scenarios` library crate.
//!
//! The binary (`infl`) is a thin wrapper around this library so that:
//!
//! - the statistical engine is testable without spawning processes
//! - the pipeline can be driven by other front-ends (notebooks, services)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod scenario;
pub mod stats;
