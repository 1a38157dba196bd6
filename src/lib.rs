//! `cru-checks` library crate.
//!
//! The binary (`cru-check`) is a thin wrapper around this library so that:
//!
//! - the acceptance logic is testable without spawning processes
//! - the prediction functions are shared by the checker and the dataset generator
//! - each physical domain stays a small, self-contained module

pub mod app;
pub mod check;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod tolerances;
