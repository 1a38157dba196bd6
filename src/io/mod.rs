//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - report exports (JSON/text) (`export`)
//! - status badge rendering (`badge`)

pub mod badge;
pub mod export;
pub mod ingest;

pub use badge::*;
pub use export::*;
pub use ingest::*;
