//! Multivariate time-series estimators.
//!
//! Both estimators reduce to a common VAR representation so forecasting and
//! interval construction are implemented once.

pub mod representation;
pub mod var;
pub mod vecm;

pub use representation::*;
pub use var::*;
pub use vecm::*;
