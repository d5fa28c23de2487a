//! The two seams of the publishing pipeline.
//!
//! - `AuditSource` produces one audit per scan day (live engine or replay)
//! - `ObjectStore` durably writes one object under a key
//!
//! The publisher and driver only ever see these traits; the concrete
//! implementations live in `clusterscan-audit` and `clusterscan-store`.

use chrono::{DateTime, Utc};

use clusterscan_contracts::{audit::AuditRun, error::ScanResult};

/// Something that can obtain an audit for a given scan day.
pub trait AuditSource {
    /// Produce the audit representing `scan_date`.
    ///
    /// Never fails: every problem is captured in the returned run as
    /// `AuditOutcome::Failed` with a descriptive message.
    fn produce_audit(&self, scan_date: DateTime<Utc>) -> AuditRun;
}

/// A key-addressed blob store.
///
/// Each call is one bounded-duration write. Implementations may retry
/// internally; callers never do.
pub trait ObjectStore {
    /// Write `body` under `key`, replacing any existing object.
    fn put_object(&self, key: &str, body: &[u8]) -> ScanResult<()>;
}
