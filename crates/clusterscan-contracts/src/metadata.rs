//! Durable records written to the object store.
//!
//! Field names on the wire are kebab-case because downstream readers of the
//! store deserialize these exact keys.

use serde::{Deserialize, Serialize};

use crate::audit::AuditOutcome;

/// Unique identifier of one published run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Final status of one scan day as recorded in its `meta` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStatus {
    Succeeded,
    AuditFailed,
    UploadFailed,
    Unknown,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::AuditFailed => "audit-failed",
            Self::UploadFailed => "upload-failed",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&AuditOutcome> for AuditStatus {
    fn from(outcome: &AuditOutcome) -> Self {
        match outcome {
            AuditOutcome::Success => Self::Succeeded,
            AuditOutcome::Failed => Self::AuditFailed,
            AuditOutcome::Unrecognized(_) => Self::Unknown,
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The per-folder run record, written once to `{folder}/meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedAuditMetadata {
    #[serde(rename = "audit-id")]
    pub run_id: RunId,

    #[serde(rename = "cluster-id")]
    pub cluster_id: String,

    #[serde(rename = "scanner-version")]
    pub scanner_version: String,

    /// Unix seconds of the scan date this record represents. Not the
    /// wall-clock publish time.
    pub timestamp: i64,

    #[serde(rename = "result")]
    pub status: AuditStatus,

    #[serde(
        rename = "failure-description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub failure_description: Option<String>,

    #[serde(rename = "polaris-version")]
    pub audit_engine_version: String,

    #[serde(rename = "polaris-audit-path")]
    pub audit_object_path: String,

    #[serde(rename = "k8s-meta-path")]
    pub cluster_metadata_object_path: String,
}

impl PublishedAuditMetadata {
    /// Record a failed upload. Only the most recent reason is kept.
    pub fn downgrade_to_upload_failed(&mut self, description: &str) {
        self.status = AuditStatus::UploadFailed;
        self.failure_description = Some(description.to_string());
    }
}

/// Liveness record for one scanner instance, overwritten on every publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerHeartbeat {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "id")]
    pub scanner_id: String,

    pub periodicity: String,

    #[serde(rename = "heartbeat-periodicity")]
    pub heartbeat_periodicity_seconds: i64,

    #[serde(rename = "heartbeat")]
    pub last_heartbeat_unix_time: i64,
}

impl ScannerHeartbeat {
    /// Scanner-kind tag understood by the result readers.
    pub const KIND: &'static str = "polaris";
}
