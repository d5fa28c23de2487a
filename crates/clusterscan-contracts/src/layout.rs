//! Object key layout inside the store.
//!
//! Pure string functions; every key is relative to the store root.

/// File name of the raw audit findings inside a run folder.
pub const AUDIT_OBJECT: &str = "audit.json";

/// File name of the raw cluster snapshot inside a run folder.
pub const CLUSTER_METADATA_OBJECT: &str = "k8s-meta.json";

/// File name of the run record inside a run folder.
pub const METADATA_OBJECT: &str = "meta";

pub fn audit_object(folder: &str) -> String {
    format!("{folder}/{AUDIT_OBJECT}")
}

pub fn cluster_metadata_object(folder: &str) -> String {
    format!("{folder}/{CLUSTER_METADATA_OBJECT}")
}

pub fn metadata_object(folder: &str) -> String {
    format!("{folder}/{METADATA_OBJECT}")
}

/// Heartbeat key, derived from the first eight characters of the scanner id.
///
/// Ids shorter than eight characters are used whole.
pub fn heartbeat_object(scanner_id: &str) -> String {
    let short: String = scanner_id.chars().take(8).collect();
    format!("polaris-{short}")
}
