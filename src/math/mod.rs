//! Numerical helpers: least squares for derived-parameter fits, and medians.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
