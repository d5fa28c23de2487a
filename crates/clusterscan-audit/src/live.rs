//! Live audits against the current cluster.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use clusterscan_contracts::audit::AuditRun;
use clusterscan_core::traits::AuditSource;

use crate::engine::AuditEngine;

/// Runs the audit engine against the live cluster.
///
/// The scan date is ignored: a live audit always reflects the cluster as
/// it is right now.
#[derive(Debug, Clone)]
pub struct LiveAudit<E> {
    engine: E,
    ruleset_path: PathBuf,
}

impl<E: AuditEngine> LiveAudit<E> {
    pub fn new(engine: E, ruleset_path: impl Into<PathBuf>) -> Self {
        Self { engine, ruleset_path: ruleset_path.into() }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn ruleset_path(&self) -> &Path {
        &self.ruleset_path
    }
}

impl<E: AuditEngine> AuditSource for LiveAudit<E> {
    fn produce_audit(&self, _scan_date: DateTime<Utc>) -> AuditRun {
        let ruleset = match self.engine.parse_ruleset(&self.ruleset_path) {
            Ok(r) => r,
            Err(e) => {
                return failed(format!(
                    "Error parsing config at {}: {e}",
                    self.ruleset_path.display()
                ))
            }
        };

        let snapshot = match self.engine.snapshot_cluster() {
            Ok(s) => s,
            Err(e) => return failed(format!("Error fetching Kubernetes resources {e}")),
        };

        let audit = match self.engine.run_audit(&ruleset, &snapshot) {
            Ok(a) => a,
            Err(e) => return failed(format!("Error getting audit data: {e}")),
        };

        info!(ruleset = %self.ruleset_path.display(), "live audit completed");
        AuditRun::succeeded(audit, snapshot)
    }
}

fn failed(description: String) -> AuditRun {
    warn!(reason = %description, "live audit failed");
    AuditRun::failed(description)
}
