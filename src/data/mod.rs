//! Representative offline datasets.

pub mod seed;

pub use seed::*;
