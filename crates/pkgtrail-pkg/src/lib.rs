//! pkgtrail-pkg: Installed-package collection
//!
//! Collectors for apt, snap, pip and `cargo install`, the timestamp
//! inference they share, and aggregation into a single time-sorted report.

pub mod aggregate;
pub mod apt;
pub mod cargo;
pub mod columns;
pub mod error;
pub mod mtime;
pub mod pip;
pub mod snap;
pub mod timestamp;
pub mod traits;
pub mod types;

#[cfg(test)]
mod mock;

pub use aggregate::{ManagerSelection, Report, collect_report};
pub use apt::AptCollector;
pub use cargo::CargoCollector;
pub use error::CollectError;
pub use pip::PipCollector;
pub use snap::SnapCollector;
pub use timestamp::parse_timestamp;
pub use traits::Collector;
pub use types::{Collection, ManagerKind, PackageRecord};
