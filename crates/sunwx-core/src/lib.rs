//! Core types and reconciliation for the sunwx dashboard
//!
//! This crate turns raw gateway and weather payloads into one normalized
//! snapshot. It performs no I/O; fetching lives in `sunwx-ingest`.

pub mod coerce;
pub mod snapshot;
pub mod solar;
pub mod types;
pub mod units;
pub mod weather;

pub use coerce::*;
pub use snapshot::*;
pub use solar::{reconcile, InverterSummary, SolarSnapshot, SolarSources};
pub use types::*;
pub use units::*;
pub use weather::*;
