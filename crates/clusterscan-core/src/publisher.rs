//! The upload pipeline: one audit run in, one published folder out.
//!
//! For every scan day the publisher writes, in order:
//!
//!   audit.json → k8s-meta.json → meta → scanner heartbeat
//!
//! The first two are skipped when the audit itself failed. Every remaining
//! write is attempted even after an earlier one fails; a failed payload
//! upload downgrades the day to `upload-failed`, and the error returned to
//! the caller is the last one encountered.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use clusterscan_contracts::{
    audit::{AuditOutcome, AuditRun, Payload},
    error::{ScanError, ScanResult},
    layout,
    metadata::{AuditStatus, PublishedAuditMetadata, RunId, ScannerHeartbeat},
};

use crate::{folder::FolderKeyGenerator, traits::ObjectStore};

/// Failure reason recorded when the audit findings could not be written.
pub const AUDIT_UPLOAD_FAILED: &str = "Uploading audit result to the blob storage failed";

/// Failure reason recorded when the cluster snapshot could not be written.
pub const CLUSTER_METADATA_UPLOAD_FAILED: &str =
    "Uploading kubernetes metadata to the blob storage failed";

/// Provenance stamped onto every published record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerIdentity {
    pub scanner_id: String,
    pub cluster_id: String,
    pub scanner_version: String,
    pub audit_engine_version: String,
    pub periodicity: String,
    pub heartbeat_periodicity_seconds: i64,
}

/// Writes audit runs and their metadata into an object store.
pub struct Publisher {
    store: Box<dyn ObjectStore>,
    keys: FolderKeyGenerator,
    identity: ScannerIdentity,
}

impl Publisher {
    pub fn new(
        store: Box<dyn ObjectStore>,
        keys: FolderKeyGenerator,
        identity: ScannerIdentity,
    ) -> Self {
        Self { store, keys, identity }
    }

    /// Publish `run` as the result for `scan_date`.
    ///
    /// Returns the metadata record that was written to `{folder}/meta`, or
    /// the last error raised by any of the writes. A returned error does not
    /// mean nothing was published: the `meta` object, when it made it to the
    /// store, is the source of truth for the day.
    pub fn publish(
        &mut self,
        run: AuditRun,
        scan_date: DateTime<Utc>,
    ) -> ScanResult<PublishedAuditMetadata> {
        let status = AuditStatus::from(&run.outcome);
        let folder = self.keys.generate(scan_date);

        let failure_description = match (&run.outcome, run.failure_description) {
            (AuditOutcome::Unrecognized(result), None) => {
                Some(format!("audit engine reported unrecognized result '{result}'"))
            }
            (_, description) => description,
        };

        let mut metadata = PublishedAuditMetadata {
            run_id: RunId::new(),
            cluster_id: self.identity.cluster_id.clone(),
            scanner_version: self.identity.scanner_version.clone(),
            timestamp: scan_date.timestamp(),
            status,
            failure_description,
            audit_engine_version: self.identity.audit_engine_version.clone(),
            audit_object_path: layout::audit_object(&folder),
            cluster_metadata_object_path: layout::cluster_metadata_object(&folder),
        };

        info!(
            folder = %folder,
            run_id = %metadata.run_id.0,
            status = %status,
            scan_date = %scan_date.date_naive(),
            "publishing audit run"
        );

        let mut last_error: Option<ScanError> = None;

        if status == AuditStatus::AuditFailed {
            debug!(folder = %folder, "audit failed, skipping payload uploads");
        } else {
            let audit = run.audit.unwrap_or(Payload::Null);
            if let Err(e) = self.upload(&metadata.audit_object_path, &audit) {
                metadata.downgrade_to_upload_failed(AUDIT_UPLOAD_FAILED);
                record_failure(&mut last_error, e);
            }

            let cluster_metadata = run.cluster_metadata.unwrap_or(Payload::Null);
            if let Err(e) = self.upload(&metadata.cluster_metadata_object_path, &cluster_metadata) {
                metadata.downgrade_to_upload_failed(CLUSTER_METADATA_UPLOAD_FAILED);
                record_failure(&mut last_error, e);
            }
        }

        if let Err(e) = self.upload(&layout::metadata_object(&folder), &metadata) {
            record_failure(&mut last_error, e);
        }

        let heartbeat = self.heartbeat(Utc::now());
        if let Err(e) = self.upload(&layout::heartbeat_object(&self.identity.scanner_id), &heartbeat)
        {
            record_failure(&mut last_error, e);
        }

        match last_error {
            Some(e) => Err(e),
            None => {
                info!(folder = %folder, status = %metadata.status, "audit run published");
                Ok(metadata)
            }
        }
    }

    fn heartbeat(&self, now: DateTime<Utc>) -> ScannerHeartbeat {
        ScannerHeartbeat {
            kind: ScannerHeartbeat::KIND.to_string(),
            scanner_id: self.identity.scanner_id.clone(),
            periodicity: self.identity.periodicity.clone(),
            heartbeat_periodicity_seconds: self.identity.heartbeat_periodicity_seconds,
            last_heartbeat_unix_time: now.timestamp(),
        }
    }

    fn upload<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ScanResult<()> {
        let body = to_tab_indented_json(value)?;
        debug!(key = %key, bytes = body.len(), "uploading object");
        self.store.put_object(key, &body)
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Serialize `value` as pretty JSON indented with one tab per level.
pub fn to_tab_indented_json<T: Serialize + ?Sized>(value: &T) -> ScanResult<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

// Later failures replace earlier ones in the returned value; each one is
// logged as it happens.
fn record_failure(last: &mut Option<ScanError>, error: ScanError) {
    warn!(
        key = error.object_path().unwrap_or("-"),
        error = %error,
        "object write failed"
    );
    *last = Some(error);
}
