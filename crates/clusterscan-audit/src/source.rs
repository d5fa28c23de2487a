//! Selecting the audit source once, at startup.

use chrono::{DateTime, Utc};
use tracing::info;

use clusterscan_config::ScannerConfig;
use clusterscan_contracts::{
    audit::AuditRun,
    error::{ScanError, ScanResult},
};
use clusterscan_core::traits::AuditSource;

use crate::{
    engine::{AuditEngine, PolarisCli},
    live::LiveAudit,
    replay::ReplayAudit,
};

/// The audit sources a configuration can select.
#[derive(Debug, Clone)]
pub enum ConfiguredAuditSource {
    Live(LiveAudit<PolarisCli>),
    Replay(ReplayAudit),
}

impl ConfiguredAuditSource {
    /// Replay when `scanner.isFake` is set, live otherwise.
    pub fn from_config(config: &ScannerConfig) -> ScanResult<Self> {
        if config.scanner.is_fake {
            let root = config
                .scanner
                .fake_results_path
                .clone()
                .ok_or_else(|| ScanError::config("missing config value: scanner.fakeResultsPath"))?;
            info!(fixtures = %root.display(), "replaying captured audits");
            Ok(Self::Replay(
                ReplayAudit::new(root).with_engine_version(&config.polaris.version),
            ))
        } else {
            info!(ruleset = %config.polaris.config_path.display(), "auditing live cluster");
            let engine = PolarisCli::default().with_version(&config.polaris.version);
            Ok(Self::Live(LiveAudit::new(engine, config.polaris.config_path.clone())))
        }
    }

    /// The audit engine version to publish with every run.
    ///
    /// Replayed fixtures were captured by the configured engine, so replay
    /// reports the configured version too.
    pub fn engine_version(&self) -> String {
        match self {
            Self::Live(live) => live.engine().version(),
            Self::Replay(replay) => replay.engine_version().to_string(),
        }
    }

    pub fn is_replay(&self) -> bool {
        matches!(self, Self::Replay(_))
    }
}

impl AuditSource for ConfiguredAuditSource {
    fn produce_audit(&self, scan_date: DateTime<Utc>) -> AuditRun {
        match self {
            Self::Live(live) => live.produce_audit(scan_date),
            Self::Replay(replay) => replay.produce_audit(scan_date),
        }
    }
}
