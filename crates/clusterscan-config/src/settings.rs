//! Configuration schema.
//!
//! Keys are camelCase. The kebab-case spellings used by older scanner
//! configuration files (`cluster-id`, `heartbeat-periodicity`) are accepted
//! as aliases.
//!
//! Example:
//! ```yaml
//! scanner:
//!   id: 3f2a9c1e-77aa-4e5b-9d11-2b0c6f1a9e00
//!   clusterId: prod-westeurope
//!   periodicity: "0 */6 * * *"
//!   heartbeatPeriodicity: 21600
//! polaris:
//!   configPath: ./config/polaris.yaml
//! blobStorageType: azure-blob-storage
//! azureBlob:
//!   storageBaseUrl: https://account.blob.core.windows.net/polaris
//!   sasToken: sv=2019-02-02&ss=b&sig=...
//! logFormat: plain-text
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Audit engine version reported when the configuration does not name one.
pub const DEFAULT_AUDIT_ENGINE_VERSION: &str = "0.6.0";

/// The top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerConfig {
    pub scanner: ScannerSection,

    #[serde(default)]
    pub polaris: PolarisSection,

    #[serde(default)]
    pub blob_storage_type: BlobStorageType,

    #[serde(default)]
    pub azure_blob: Option<AzureBlobSection>,

    #[serde(default)]
    pub local_directory: Option<LocalDirectorySection>,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Identity and scheduling of this scanner instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerSection {
    /// Unique scanner id; its first eight characters name the heartbeat object.
    pub id: String,

    #[serde(default, alias = "cluster-id")]
    pub cluster_id: String,

    /// Cron expression or `on-message`. Reported verbatim in the heartbeat.
    #[serde(default)]
    pub periodicity: String,

    /// Seconds between heartbeats.
    #[serde(default, alias = "heartbeat-periodicity")]
    pub heartbeat_periodicity: i64,

    /// Replay captured fixtures instead of auditing the live cluster.
    #[serde(default)]
    pub is_fake: bool,

    #[serde(default)]
    pub fake_results_path: Option<PathBuf>,

    /// First replayed day, `YYYY-MM-DD`. Replay mode only.
    #[serde(default)]
    pub from: Option<String>,

    /// Last replayed day, `YYYY-MM-DD`. Replay mode only.
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolarisSection {
    /// Ruleset file handed to the audit engine.
    #[serde(default)]
    pub config_path: PathBuf,

    #[serde(default = "default_engine_version")]
    pub version: String,
}

impl Default for PolarisSection {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            version: default_engine_version(),
        }
    }
}

fn default_engine_version() -> String {
    DEFAULT_AUDIT_ENGINE_VERSION.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlobStorageType {
    #[default]
    AzureBlobStorage,
    LocalDirectory,
}

/// Container URL plus a pre-issued SAS token appended to every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureBlobSection {
    pub storage_base_url: String,

    #[serde(default)]
    pub sas_token: String,

    /// Extra attempts per object after the first one fails.
    #[serde(default)]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalDirectorySection {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    PlainText,
    Json,
}
