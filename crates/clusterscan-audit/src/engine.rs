//! The boundary to the external policy-audit engine.
//!
//! `AuditEngine` is the three-step contract the live source drives, plus the
//! version it reports in published metadata. The
//! shipped implementation, `PolarisCli`, shells out to `kubectl` for the
//! cluster snapshot and to the `polaris` executable for the audit itself.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use tracing::debug;

use clusterscan_config::DEFAULT_AUDIT_ENGINE_VERSION;
use clusterscan_contracts::{
    audit::Payload,
    error::{ScanError, ScanResult},
};

/// A parsed audit ruleset.
#[derive(Debug, Clone, PartialEq)]
pub struct Ruleset {
    /// Where the ruleset was read from; engines that need a file use this.
    pub path: PathBuf,
    /// The ruleset document itself.
    pub document: Payload,
}

/// An engine that audits a cluster snapshot against a ruleset.
pub trait AuditEngine {
    /// Read and validate the ruleset at `path`.
    fn parse_ruleset(&self, path: &Path) -> ScanResult<Ruleset>;

    /// Capture the live cluster's resources.
    fn snapshot_cluster(&self) -> ScanResult<Payload>;

    /// Audit `snapshot` against `ruleset` and return the raw findings.
    fn run_audit(&self, ruleset: &Ruleset, snapshot: &Payload) -> ScanResult<Payload>;

    /// The engine version recorded alongside every published audit.
    fn version(&self) -> String;
}

/// Resource kinds captured in the cluster snapshot.
pub const DEFAULT_RESOURCE_KINDS: &[&str] = &[
    "namespaces",
    "deployments",
    "statefulsets",
    "daemonsets",
    "jobs",
    "cronjobs",
    "replicationcontrollers",
    "pods",
];

/// Drives the `polaris` and `kubectl` command-line tools.
#[derive(Debug, Clone)]
pub struct PolarisCli {
    polaris_bin: PathBuf,
    kubectl_bin: PathBuf,
    resource_kinds: Vec<String>,
    version: String,
}

impl Default for PolarisCli {
    fn default() -> Self {
        Self::new("polaris", "kubectl")
    }
}

impl PolarisCli {
    pub fn new(polaris_bin: impl Into<PathBuf>, kubectl_bin: impl Into<PathBuf>) -> Self {
        Self {
            polaris_bin: polaris_bin.into(),
            kubectl_bin: kubectl_bin.into(),
            resource_kinds: DEFAULT_RESOURCE_KINDS.iter().map(|k| k.to_string()).collect(),
            version: DEFAULT_AUDIT_ENGINE_VERSION.to_string(),
        }
    }

    /// Report `version` as the engine version instead of the default.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl AuditEngine for PolarisCli {
    fn parse_ruleset(&self, path: &Path) -> ScanResult<Ruleset> {
        let contents = std::fs::read_to_string(path).map_err(|e| ScanError::Engine {
            reason: format!("failed to read ruleset '{}': {e}", path.display()),
        })?;
        let document: Payload = serde_yml::from_str(&contents).map_err(|e| ScanError::Engine {
            reason: format!("failed to parse ruleset '{}': {e}", path.display()),
        })?;
        if !document.is_object() {
            return Err(ScanError::Engine {
                reason: format!("ruleset '{}' is not a mapping", path.display()),
            });
        }
        Ok(Ruleset { path: path.to_path_buf(), document })
    }

    fn snapshot_cluster(&self) -> ScanResult<Payload> {
        let mut cmd = Command::new(&self.kubectl_bin);
        cmd.arg("get")
            .arg(self.resource_kinds.join(","))
            .args(["--all-namespaces", "-o", "json"]);
        let stdout = run_command(cmd)?;
        parse_json_output("kubectl", &stdout)
    }

    fn run_audit(&self, ruleset: &Ruleset, snapshot: &Payload) -> ScanResult<Payload> {
        let workdir = tempfile::tempdir().map_err(|e| ScanError::Engine {
            reason: format!("failed to create snapshot directory: {e}"),
        })?;
        let snapshot_path = workdir.path().join("cluster-snapshot.json");
        let body = serde_json::to_vec(snapshot)?;
        std::fs::write(&snapshot_path, body).map_err(|e| ScanError::Engine {
            reason: format!("failed to write snapshot '{}': {e}", snapshot_path.display()),
        })?;

        let mut cmd = Command::new(&self.polaris_bin);
        cmd.arg("audit")
            .arg("--config")
            .arg(&ruleset.path)
            .arg("--audit-path")
            .arg(workdir.path())
            .args(["--format", "json"]);
        let stdout = run_command(cmd)?;
        parse_json_output("polaris", &stdout)
    }

    fn version(&self) -> String {
        self.version.clone()
    }
}

fn run_command(mut cmd: Command) -> ScanResult<Vec<u8>> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    debug!(program = %program, "running audit engine command");

    let output = cmd.output().map_err(|e| ScanError::Engine {
        reason: format!("failed to run '{program}': {e}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScanError::Engine {
            reason: format!("'{program}' exited with {}: {}", output.status, stderr.trim()),
        });
    }
    Ok(output.stdout)
}

fn parse_json_output(program: &str, stdout: &[u8]) -> ScanResult<Payload> {
    serde_json::from_slice(stdout).map_err(|e| ScanError::Engine {
        reason: format!("'{program}' produced invalid JSON: {e}"),
    })
}
