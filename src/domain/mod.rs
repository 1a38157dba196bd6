//! Domain types used throughout the checker.
//!
//! This module defines:
//!
//! - domain identifiers and verdicts (`DomainId`, `Verdict`)
//! - typed dataset rows (`SpectrumRow`, `FluxRow`, `StrainRow`, `ExclusionRow`)
//! - report outputs (`DomainReport`, `CheckReport`)
//! - run configuration (`CheckConfig`, `SeedConfig`)

pub mod types;

pub use types::*;
