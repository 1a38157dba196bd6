//! CRU model: parameter table and closed-form predictions.
//!
//! Predictions are small, pure functions so the checkers (and the dataset generator) can
//! stay generic over domains.

pub mod params;
pub mod predict;

pub use params::*;
pub use predict::*;
