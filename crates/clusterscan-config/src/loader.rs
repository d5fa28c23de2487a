//! Loading and validating a `ScannerConfig`.
//!
//! The decoder is picked from the file extension: `.json` and `.toml` files
//! use their own decoders, anything else is read as YAML. After decoding,
//! `validate` checks the cross-field rules that serde cannot express.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use clusterscan_contracts::error::{ScanError, ScanResult};
use clusterscan_core::{driver::DateRange, publisher::ScannerIdentity};

use crate::settings::{BlobStorageType, ScannerConfig};

/// Environment variable that carries the scanner build version.
pub const SCANNER_VERSION_ENV: &str = "SCANNER_VERSION";

impl ScannerConfig {
    pub fn from_yaml_str(s: &str) -> ScanResult<Self> {
        let config: Self = serde_yml::from_str(s)
            .map_err(|e| ScanError::config(format!("decoding config failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> ScanResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| ScanError::config(format!("decoding config failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> ScanResult<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| ScanError::config(format!("decoding config failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate the configuration file at `path`.
    pub fn from_file(path: &Path) -> ScanResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ScanError::config(format!("failed to read config file '{}': {e}", path.display()))
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        debug!(path = %path.display(), extension, "decoding configuration");

        let config = match extension {
            "json" => Self::from_json_str(&contents),
            "toml" => Self::from_toml_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }?;

        info!(
            path = %path.display(),
            scanner_id = %config.scanner.id,
            replay = config.scanner.is_fake,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Check the rules that span several fields.
    pub fn validate(&self) -> ScanResult<()> {
        let scanner = &self.scanner;

        if scanner.id.trim().is_empty() {
            return Err(ScanError::config("missing config value: scanner.id"));
        }

        let has_from = scanner.from.as_deref().is_some_and(|s| !s.is_empty());
        let has_to = scanner.to.as_deref().is_some_and(|s| !s.is_empty());

        if scanner.is_fake {
            if has_from != has_to {
                return Err(ScanError::config(
                    "from and to dates should both have values, or both be empty",
                ));
            }
            if scanner
                .fake_results_path
                .as_ref()
                .is_none_or(|p| p.as_os_str().is_empty())
            {
                return Err(ScanError::config("missing config value: scanner.fakeResultsPath"));
            }
        } else {
            if has_from || has_to {
                return Err(ScanError::config(
                    "from and to dates are supported only for fake scanner",
                ));
            }
            if self.polaris.config_path.as_os_str().is_empty() {
                return Err(ScanError::config("missing config value: polaris.configPath"));
            }
        }

        match self.blob_storage_type {
            BlobStorageType::AzureBlobStorage => {
                let base = self.azure_blob.as_ref().map(|a| a.storage_base_url.trim());
                if base.is_none_or(str::is_empty) {
                    return Err(ScanError::config(
                        "missing config value: azureBlob.storageBaseUrl",
                    ));
                }
            }
            BlobStorageType::LocalDirectory => {
                let path = self.local_directory.as_ref().map(|l| l.path.as_os_str());
                if path.is_none_or(|p| p.is_empty()) {
                    return Err(ScanError::config("missing config value: localDirectory.path"));
                }
            }
        }

        Ok(())
    }

    /// The scan days this invocation covers.
    pub fn date_range(&self, today: NaiveDate) -> ScanResult<DateRange> {
        DateRange::resolve(self.scanner.from.as_deref(), self.scanner.to.as_deref(), today)
    }

    /// Provenance stamped onto every published record.
    ///
    /// `scanner_version` is usually the value of `SCANNER_VERSION`.
    pub fn identity(&self, scanner_version: impl Into<String>) -> ScannerIdentity {
        ScannerIdentity {
            scanner_id: self.scanner.id.clone(),
            cluster_id: self.scanner.cluster_id.clone(),
            scanner_version: scanner_version.into(),
            audit_engine_version: self.polaris.version.clone(),
            periodicity: self.scanner.periodicity.clone(),
            heartbeat_periodicity_seconds: self.scanner.heartbeat_periodicity,
        }
    }
}

/// The scanner version from the environment, or this crate's version.
pub fn scanner_version() -> String {
    std::env::var(SCANNER_VERSION_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
}
