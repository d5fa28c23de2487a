//! Replay of previously captured audits from a fixture directory.
//!
//! Fixtures are laid out as `{root}/{day}/audit.json` and
//! `{root}/{day}/k8s-meta.json`. Only the first half of a month is stored;
//! later days reuse a mirrored fixture (see `mirror_day`).

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, warn};

use clusterscan_config::DEFAULT_AUDIT_ENGINE_VERSION;
use clusterscan_contracts::{
    audit::{AuditRun, Payload},
    layout::{AUDIT_OBJECT, CLUSTER_METADATA_OBJECT},
};
use clusterscan_core::traits::AuditSource;

/// Fixture sub-folder used for `day` of the month.
///
/// Days before the 16th map to themselves; the rest map to `31 - day`, so the
/// 20th reuses the 11th and the 31st maps to folder `0`.
pub fn mirror_day(day: u32) -> u32 {
    if day < 16 {
        day
    } else {
        31 - day
    }
}

/// Loads audit results from a local fixture store, keyed by calendar day.
#[derive(Debug, Clone)]
pub struct ReplayAudit {
    root: PathBuf,
    engine_version: String,
}

impl ReplayAudit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            engine_version: DEFAULT_AUDIT_ENGINE_VERSION.to_string(),
        }
    }

    /// Record the fixtures as produced by engine `version`.
    pub fn with_engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = version.into();
        self
    }

    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }

    /// The fixture folder that backs `scan_date`, resolved against the
    /// current directory when the root is relative.
    pub fn fixture_dir(&self, scan_date: DateTime<Utc>) -> io::Result<PathBuf> {
        let root = std::path::absolute(&self.root)?;
        Ok(root.join(mirror_day(scan_date.day()).to_string()))
    }

    fn load(&self, scan_date: DateTime<Utc>) -> Result<AuditRun, String> {
        let dir = self.fixture_dir(scan_date).map_err(|e| {
            format!("Error parsing fake-results path {}: {e}", self.root.display())
        })?;
        debug!(fixture = %dir.display(), date = %scan_date.date_naive(), "loading replay fixture");

        let cluster_metadata = read_document(&dir.join(CLUSTER_METADATA_OBJECT))?;
        let audit = read_document(&dir.join(AUDIT_OBJECT))?;
        Ok(AuditRun::succeeded(audit, cluster_metadata))
    }
}

impl AuditSource for ReplayAudit {
    fn produce_audit(&self, scan_date: DateTime<Utc>) -> AuditRun {
        self.load(scan_date).unwrap_or_else(|reason| {
            warn!(reason = %reason, "replay fixture unavailable");
            AuditRun::failed(reason)
        })
    }
}

fn read_document(path: &Path) -> Result<Payload, String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Error reading fixture {}: {e}", path.display()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| format!("Error parsing fixture {}: {e}", path.display()))
}
