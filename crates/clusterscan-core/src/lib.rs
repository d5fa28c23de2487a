//! # clusterscan-core
//!
//! The audit → upload → metadata-publish pipeline.
//!
//! This crate provides:
//! - The two seams (`AuditSource`, `ObjectStore`)
//! - `FolderKeyGenerator`, which names each run's folder
//! - `Publisher`, which writes one day's objects with partial-failure rules
//! - `Driver`, which walks a date range one day at a time

pub mod driver;
pub mod folder;
pub mod publisher;
pub mod traits;

pub use driver::{DateRange, DayOutcome, Driver, RunSummary};
pub use folder::FolderKeyGenerator;
pub use publisher::{Publisher, ScannerIdentity};
