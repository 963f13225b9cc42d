//! Mathematical utilities: least squares, small dense linear algebra helpers,
//! and the standard normal distribution.

pub mod linalg;
pub mod normal;
pub mod ols;

pub use linalg::*;
pub use normal::*;
pub use ols::*;
