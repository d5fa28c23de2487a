//! # clusterscan-config
//!
//! Configuration model, decoding, and validation for clusterscan.
//!
//! ```rust,ignore
//! use std::path::Path;
//! use clusterscan_config::ScannerConfig;
//!
//! let config = ScannerConfig::from_file(Path::new("config/scanner-config.yaml"))?;
//! let range = config.date_range(chrono::Utc::now().date_naive())?;
//! ```

pub mod loader;
pub mod settings;

pub use loader::{scanner_version, SCANNER_VERSION_ENV};
pub use settings::{
    AzureBlobSection, BlobStorageType, LocalDirectorySection, LogFormat, PolarisSection,
    ScannerConfig, ScannerSection, DEFAULT_AUDIT_ENGINE_VERSION,
};

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use clusterscan_contracts::error::ScanError;

    use crate::{BlobStorageType, LogFormat, ScannerConfig};

    const LIVE: &str = r#"
scanner:
  id: 3f2a9c1e-77aa-4e5b-9d11-2b0c6f1a9e00
  clusterId: prod-westeurope
  periodicity: "0 */6 * * *"
  heartbeatPeriodicity: 21600
polaris:
  configPath: ./config/polaris.yaml
blobStorageType: azure-blob-storage
azureBlob:
  storageBaseUrl: https://account.blob.core.windows.net/polaris
  sasToken: sv=2019-02-02&sig=abc
logFormat: json
"#;

    fn replay(from: Option<&str>, to: Option<&str>) -> String {
        let mut doc = String::from(
            "scanner:\n  id: replay-scanner-01\n  isFake: true\n  fakeResultsPath: ./fixtures\n",
        );
        if let Some(from) = from {
            doc.push_str(&format!("  from: \"{from}\"\n"));
        }
        if let Some(to) = to {
            doc.push_str(&format!("  to: \"{to}\"\n"));
        }
        doc.push_str("blobStorageType: local-directory\nlocalDirectory:\n  path: ./out\n");
        doc
    }

    fn assert_config_error(result: Result<ScannerConfig, ScanError>, needle: &str) {
        match result {
            Err(ScanError::Config { reason }) => {
                assert!(reason.contains(needle), "expected '{needle}' in '{reason}'")
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    // ── Decoding ──────────────────────────────────────────────────────────────

    #[test]
    fn live_yaml_decodes() {
        let config = ScannerConfig::from_yaml_str(LIVE).unwrap();

        assert_eq!(config.scanner.cluster_id, "prod-westeurope");
        assert_eq!(config.scanner.heartbeat_periodicity, 21_600);
        assert!(!config.scanner.is_fake);
        assert_eq!(config.polaris.config_path, PathBuf::from("./config/polaris.yaml"));
        assert_eq!(config.polaris.version, "0.6.0");
        assert_eq!(config.blob_storage_type, BlobStorageType::AzureBlobStorage);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.azure_blob.unwrap().max_retries, 0);
    }

    #[test]
    fn kebab_case_aliases_are_accepted() {
        let doc = LIVE
            .replace("clusterId", "cluster-id")
            .replace("heartbeatPeriodicity", "heartbeat-periodicity");
        let config = ScannerConfig::from_yaml_str(&doc).unwrap();
        assert_eq!(config.scanner.cluster_id, "prod-westeurope");
        assert_eq!(config.scanner.heartbeat_periodicity, 21_600);
    }

    #[test]
    fn json_and_toml_decode_the_same_model() {
        let json = r#"{
            "scanner": { "id": "abc12345", "isFake": true, "fakeResultsPath": "/fx" },
            "blobStorageType": "local-directory",
            "localDirectory": { "path": "/out" }
        }"#;
        let toml = r#"
            blobStorageType = "local-directory"
            [scanner]
            id = "abc12345"
            isFake = true
            fakeResultsPath = "/fx"
            [localDirectory]
            path = "/out"
        "#;
        let a = ScannerConfig::from_json_str(json).unwrap();
        let b = ScannerConfig::from_toml_str(toml).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.log_format, LogFormat::PlainText);
    }

    #[test]
    fn unknown_storage_type_is_rejected() {
        let doc = LIVE.replace("azure-blob-storage", "s3");
        assert_config_error(ScannerConfig::from_yaml_str(&doc), "decoding config failed");
    }

    #[test]
    fn from_file_picks_decoder_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("scanner-config.yaml");
        std::fs::write(&yaml, LIVE).unwrap();
        assert!(ScannerConfig::from_file(&yaml).is_ok());

        // YAML content in a .json file must go through the JSON decoder.
        let json = dir.path().join("scanner-config.json");
        std::fs::write(&json, LIVE).unwrap();
        assert_config_error(ScannerConfig::from_file(&json), "decoding config failed");

        assert_config_error(
            ScannerConfig::from_file(&dir.path().join("missing.yaml")),
            "failed to read config file",
        );
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn replay_requires_both_or_neither_bound() {
        assert!(ScannerConfig::from_yaml_str(&replay(None, None)).is_ok());
        assert!(ScannerConfig::from_yaml_str(&replay(Some("2024-01-01"), Some("2024-01-03"))).is_ok());
        assert_config_error(
            ScannerConfig::from_yaml_str(&replay(Some("2024-01-01"), None)),
            "both have values",
        );
        assert_config_error(
            ScannerConfig::from_yaml_str(&replay(None, Some("2024-01-03"))),
            "both have values",
        );
    }

    #[test]
    fn live_mode_rejects_date_bounds() {
        let doc = LIVE.replace(
            "  heartbeatPeriodicity: 21600\n",
            "  heartbeatPeriodicity: 21600\n  from: \"2024-01-01\"\n  to: \"2024-01-03\"\n",
        );
        assert_config_error(ScannerConfig::from_yaml_str(&doc), "only for fake scanner");
    }

    #[test]
    fn replay_requires_fixture_path() {
        let doc = replay(None, None).replace("  fakeResultsPath: ./fixtures\n", "");
        assert_config_error(ScannerConfig::from_yaml_str(&doc), "fakeResultsPath");
    }

    #[test]
    fn scanner_id_is_required() {
        let doc = LIVE.replace("id: 3f2a9c1e-77aa-4e5b-9d11-2b0c6f1a9e00", "id: \"\"");
        assert_config_error(ScannerConfig::from_yaml_str(&doc), "scanner.id");
    }

    #[test]
    fn azure_storage_requires_base_url() {
        let doc = LIVE.replace(
            "storageBaseUrl: https://account.blob.core.windows.net/polaris",
            "storageBaseUrl: \"\"",
        );
        assert_config_error(ScannerConfig::from_yaml_str(&doc), "storageBaseUrl");
    }

    // ── Derived values ────────────────────────────────────────────────────────

    #[test]
    fn date_range_follows_configuration() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let live = ScannerConfig::from_yaml_str(LIVE).unwrap();
        let range = live.date_range(today).unwrap();
        assert_eq!((range.start(), range.end()), (today, today));

        let backfill =
            ScannerConfig::from_yaml_str(&replay(Some("2024-01-01"), Some("2024-01-03"))).unwrap();
        assert_eq!(backfill.date_range(today).unwrap().days().count(), 3);

        let reversed =
            ScannerConfig::from_yaml_str(&replay(Some("2024-01-03"), Some("2024-01-01"))).unwrap();
        assert!(matches!(
            reversed.date_range(today),
            Err(ScanError::DateRange { .. })
        ));
    }

    #[test]
    fn identity_carries_provenance() {
        let config = ScannerConfig::from_yaml_str(LIVE).unwrap();
        let identity = config.identity("9.9.9");

        assert_eq!(identity.scanner_id, "3f2a9c1e-77aa-4e5b-9d11-2b0c6f1a9e00");
        assert_eq!(identity.cluster_id, "prod-westeurope");
        assert_eq!(identity.scanner_version, "9.9.9");
        assert_eq!(identity.audit_engine_version, "0.6.0");
        assert_eq!(identity.heartbeat_periodicity_seconds, 21_600);
    }
}
