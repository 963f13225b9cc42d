//! Unit-root and cointegration tests.
//!
//! - `adf`: Augmented Dickey-Fuller with AIC lag selection and MacKinnon p-values
//! - `johansen`: Johansen trace test with Osterwald-Lenum critical values

pub mod adf;
pub mod johansen;

pub use adf::*;
pub use johansen::*;
