//! # clusterscan-audit
//!
//! Audit sources for clusterscan.
//!
//! - [`LiveAudit`] runs an [`AuditEngine`] against the current cluster
//! - [`ReplayAudit`] loads captured results from a fixture directory
//! - [`ConfiguredAuditSource`] picks one of the two from configuration
//!
//! All of them implement `clusterscan_core::traits::AuditSource` and never
//! return an error: failures come back as a failed `AuditRun`.

pub mod engine;
pub mod live;
pub mod replay;
pub mod source;

pub use engine::{AuditEngine, PolarisCli, Ruleset};
pub use live::LiveAudit;
pub use replay::{mirror_day, ReplayAudit};
pub use source::ConfiguredAuditSource;

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        path::{Path, PathBuf},
    };

    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    use clusterscan_config::ScannerConfig;
    use clusterscan_contracts::{
        audit::{AuditOutcome, Payload},
        error::{ScanError, ScanResult},
    };
    use clusterscan_core::traits::AuditSource;

    use super::*;

    // ── Mock engine ───────────────────────────────────────────────────────────

    #[derive(Clone, Copy, PartialEq)]
    enum FailAt {
        Nowhere,
        Ruleset,
        Snapshot,
        Audit,
    }

    struct MockEngine {
        fail_at: FailAt,
        audits_run: Cell<u32>,
    }

    impl MockEngine {
        fn new(fail_at: FailAt) -> Self {
            Self { fail_at, audits_run: Cell::new(0) }
        }

        fn fail(&self, step: FailAt, reason: &str) -> ScanResult<()> {
            if self.fail_at == step {
                return Err(ScanError::Engine { reason: reason.to_string() });
            }
            Ok(())
        }
    }

    impl AuditEngine for MockEngine {
        fn parse_ruleset(&self, path: &Path) -> ScanResult<Ruleset> {
            self.fail(FailAt::Ruleset, "bad yaml")?;
            Ok(Ruleset { path: path.to_path_buf(), document: json!({ "checks": {} }) })
        }

        fn snapshot_cluster(&self) -> ScanResult<Payload> {
            self.fail(FailAt::Snapshot, "connection refused")?;
            Ok(json!({ "kind": "List", "items": [1, 2] }))
        }

        fn run_audit(&self, _ruleset: &Ruleset, snapshot: &Payload) -> ScanResult<Payload> {
            self.audits_run.set(self.audits_run.get() + 1);
            self.fail(FailAt::Audit, "validator crashed")?;
            Ok(json!({ "Results": [], "SourceItems": snapshot["items"].clone() }))
        }

        fn version(&self) -> String {
            "9.9.9-mock".to_string()
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn on_day(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap()
    }

    fn write_fixture(root: &Path, folder: &str, audit: &str, meta: &str) {
        let dir = root.join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("audit.json"), audit).unwrap();
        std::fs::write(dir.join("k8s-meta.json"), meta).unwrap();
    }

    // ── Mirror rule ───────────────────────────────────────────────────────────

    #[test]
    fn mirror_day_reflects_second_half_of_month() {
        assert_eq!(mirror_day(1), 1);
        assert_eq!(mirror_day(5), 5);
        assert_eq!(mirror_day(15), 15);
        assert_eq!(mirror_day(16), 15);
        assert_eq!(mirror_day(20), 11);
        assert_eq!(mirror_day(30), 1);
        assert_eq!(mirror_day(31), 0);

        for day in 1..=31 {
            let expected = if day < 16 { day } else { 31 - day };
            assert_eq!(mirror_day(day), expected, "day {day}");
            assert!(mirror_day(day) <= 15);
        }
    }

    // ── Replay ────────────────────────────────────────────────────────────────

    #[test]
    fn replay_loads_mirrored_fixture() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "11", r#"{"day": 11}"#, r#"{"items": []}"#);

        let replay = ReplayAudit::new(dir.path());
        assert_eq!(replay.fixture_dir(on_day(20)).unwrap(), dir.path().join("11"));

        let run = replay.produce_audit(on_day(20));
        assert_eq!(run.outcome, AuditOutcome::Success);
        assert_eq!(run.audit, Some(json!({ "day": 11 })));
        assert_eq!(run.cluster_metadata, Some(json!({ "items": [] })));
        assert!(run.failure_description.is_none());
    }

    #[test]
    fn replay_relative_root_resolves_against_current_dir() {
        let replay = ReplayAudit::new("fixtures");
        let dir = replay.fixture_dir(on_day(17)).unwrap();

        assert!(dir.is_absolute(), "got: {}", dir.display());
        assert_eq!(dir, std::env::current_dir().unwrap().join("fixtures").join("14"));

        // The failure text names the same folder the loader looked in.
        let run = replay.produce_audit(on_day(17));
        let reason = run.failure_description.unwrap();
        assert!(reason.contains(&dir.display().to_string()), "got: {reason}");
    }

    #[test]
    fn replay_missing_fixture_is_a_failed_run() {
        let dir = tempfile::tempdir().unwrap();
        let run = ReplayAudit::new(dir.path()).produce_audit(on_day(3));

        assert!(run.is_failed());
        let reason = run.failure_description.unwrap();
        assert!(reason.starts_with("Error reading fixture"), "got: {reason}");
        assert!(reason.contains("k8s-meta.json"), "got: {reason}");
        assert!(run.audit.is_none());
    }

    #[test]
    fn replay_malformed_fixture_is_a_failed_run() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "4", "{ not json", r#"{"items": []}"#);

        let run = ReplayAudit::new(dir.path()).produce_audit(on_day(4));

        assert!(run.is_failed());
        let reason = run.failure_description.unwrap();
        assert!(reason.starts_with("Error parsing fixture"), "got: {reason}");
        assert!(reason.contains("audit.json"), "got: {reason}");
        assert!(run.cluster_metadata.is_none());
    }

    #[test]
    fn replay_day_31_uses_folder_zero() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "0", "[]", "{}");

        let run = ReplayAudit::new(dir.path()).produce_audit(on_day(31));
        assert_eq!(run.outcome, AuditOutcome::Success);
        assert_eq!(run.audit, Some(json!([])));
    }

    // ── Live ──────────────────────────────────────────────────────────────────

    #[test]
    fn live_success_returns_audit_and_snapshot() {
        let live = LiveAudit::new(MockEngine::new(FailAt::Nowhere), "/etc/polaris.yaml");
        let run = live.produce_audit(on_day(1));

        assert_eq!(run.outcome, AuditOutcome::Success);
        assert_eq!(run.audit.unwrap()["SourceItems"], json!([1, 2]));
        assert_eq!(run.cluster_metadata.unwrap()["kind"], json!("List"));
    }

    #[test]
    fn live_ruleset_failure_names_the_ruleset() {
        let live = LiveAudit::new(MockEngine::new(FailAt::Ruleset), "/etc/polaris.yaml");
        let run = live.produce_audit(on_day(1));

        assert!(run.is_failed());
        let reason = run.failure_description.unwrap();
        assert!(reason.starts_with("Error parsing config at /etc/polaris.yaml"));
        assert!(reason.contains("bad yaml"));
    }

    #[test]
    fn live_snapshot_failure_skips_audit() {
        let engine = MockEngine::new(FailAt::Snapshot);
        let live = LiveAudit::new(engine, "/etc/polaris.yaml");
        let run = live.produce_audit(on_day(1));

        assert!(run.is_failed());
        assert!(run
            .failure_description
            .unwrap()
            .starts_with("Error fetching Kubernetes resources"));
        assert_eq!(live_engine_audits(&live), 0);
    }

    #[test]
    fn live_audit_failure_keeps_no_partial_output() {
        let live = LiveAudit::new(MockEngine::new(FailAt::Audit), "/etc/polaris.yaml");
        let run = live.produce_audit(on_day(1));

        assert!(run.is_failed());
        assert!(run
            .failure_description
            .unwrap()
            .contains("Error getting audit data: audit engine error: validator crashed"));
        assert!(run.audit.is_none());
        assert!(run.cluster_metadata.is_none());
    }

    #[test]
    fn live_reports_engine_version() {
        let live = LiveAudit::new(MockEngine::new(FailAt::Nowhere), "/etc/polaris.yaml");
        assert_eq!(live.engine().version(), "9.9.9-mock");
    }

    fn live_engine_audits(live: &LiveAudit<MockEngine>) -> u32 {
        live.engine().audits_run.get()
    }

    // ── Polaris CLI engine ────────────────────────────────────────────────────

    #[test]
    fn polaris_ruleset_must_be_a_yaml_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.yaml");
        std::fs::write(&good, "checks:\n  cpuRequestsMissing: warning\n").unwrap();
        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "- just\n- a list\n").unwrap();

        let engine = PolarisCli::default();
        assert_eq!(engine.version(), "0.6.0");
        assert_eq!(PolarisCli::default().with_version("5.1.0").version(), "5.1.0");
        let ruleset = engine.parse_ruleset(&good).unwrap();
        assert_eq!(ruleset.document["checks"]["cpuRequestsMissing"], json!("warning"));
        assert!(engine.parse_ruleset(&bad).is_err());
        assert!(engine.parse_ruleset(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn missing_engine_binary_is_an_engine_error() {
        let engine = PolarisCli::new(
            "/nonexistent/clusterscan-test/polaris",
            "/nonexistent/clusterscan-test/kubectl",
        );
        match engine.snapshot_cluster() {
            Err(ScanError::Engine { reason }) => assert!(reason.contains("failed to run")),
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    #[test]
    fn configuration_selects_source_variant() {
        let replay = ScannerConfig::from_yaml_str(
            "scanner:\n  id: abcdefgh\n  isFake: true\n  fakeResultsPath: /fixtures\n\
             blobStorageType: local-directory\nlocalDirectory:\n  path: /out\n",
        )
        .unwrap();
        let replay_source = ConfiguredAuditSource::from_config(&replay).unwrap();
        assert!(replay_source.is_replay());
        assert_eq!(replay_source.engine_version(), "0.6.0");

        let live = ScannerConfig::from_yaml_str(
            "scanner:\n  id: abcdefgh\npolaris:\n  configPath: /etc/polaris.yaml\n  version: 5.1.0\n\
             blobStorageType: local-directory\nlocalDirectory:\n  path: /out\n",
        )
        .unwrap();
        let source = ConfiguredAuditSource::from_config(&live).unwrap();
        assert!(!source.is_replay());
        assert_eq!(source.engine_version(), "5.1.0");
        assert!(matches!(source, ConfiguredAuditSource::Live(ref l)
            if l.ruleset_path() == PathBuf::from("/etc/polaris.yaml").as_path()));
    }
}
