//! The ephemeral result of obtaining one audit.
//!
//! An `AuditRun` is produced by an audit source for a single scan day and
//! consumed by value by the publisher. It describes whether the audit could
//! be *obtained*, not whether the cluster passed it.

/// An opaque, JSON-shaped document.
///
/// The audit engine's findings and the cluster snapshot are passed through
/// untouched; nothing in this workspace inspects their structure.
pub type Payload = serde_json::Value;

/// Outcome of obtaining an audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Failed,
    /// A free-text result the engine reported that is neither of the above.
    Unrecognized(String),
}

impl AuditOutcome {
    /// Map an engine-reported result string onto an outcome.
    pub fn from_engine_result(result: &str) -> Self {
        match result {
            "success" => Self::Success,
            "failed" => Self::Failed,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// One audit attempt for one scan day.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRun {
    pub outcome: AuditOutcome,
    /// Human-readable reason, present only when `outcome` is `Failed`.
    pub failure_description: Option<String>,
    /// Raw audit findings, present only on success.
    pub audit: Option<Payload>,
    /// Raw cluster resource snapshot, present only on success.
    pub cluster_metadata: Option<Payload>,
}

impl AuditRun {
    /// A run whose audit and cluster snapshot were both obtained.
    pub fn succeeded(audit: Payload, cluster_metadata: Payload) -> Self {
        Self {
            outcome: AuditOutcome::Success,
            failure_description: None,
            audit: Some(audit),
            cluster_metadata: Some(cluster_metadata),
        }
    }

    /// A run that produced no audit output.
    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            outcome: AuditOutcome::Failed,
            failure_description: Some(description.into()),
            audit: None,
            cluster_metadata: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == AuditOutcome::Failed
    }
}
