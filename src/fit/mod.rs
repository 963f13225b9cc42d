//! Model selection and estimation.
//!
//! - `lag_order`: AIC lag search shared by both branches
//! - `selection`: the VAR/VECM decision cascade and the fitted model

pub mod lag_order;
pub mod selection;

pub use lag_order::*;
pub use selection::*;
