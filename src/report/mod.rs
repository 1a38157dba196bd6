//! Terminal rendering of check results.

pub mod format;

pub use format::*;
