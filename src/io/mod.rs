//! Input/output helpers.
//!
//! - aligned series CSV ingest (`ingest`)
//! - scenario CSV and result JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
