//! Error types for the scan publishing pipeline.
//!
//! Every fallible operation returns `ScanResult<T>`. Only the binary decides
//! whether an error is fatal to the process.

use thiserror::Error;

/// The unified error type for clusterscan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The configuration file is missing, malformed, or inconsistent.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The requested scan date range is invalid.
    #[error("invalid date range: {reason}")]
    DateRange { reason: String },

    /// The external audit engine could not be invoked or returned garbage.
    #[error("audit engine error: {reason}")]
    Engine { reason: String },

    /// Writing an object to the store failed.
    #[error("upload of '{path}' failed: {reason}")]
    Upload { path: String, reason: String },

    /// Writing an object exceeded the per-call time budget.
    #[error("upload of '{path}' timed out")]
    Timeout { path: String },

    /// A record could not be encoded for upload.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl ScanError {
    /// Shorthand for a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    /// The object key the error relates to, for upload failures.
    pub fn object_path(&self) -> Option<&str> {
        match self {
            Self::Upload { path, .. } | Self::Timeout { path } => Some(path),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization { reason: e.to_string() }
    }
}

/// Convenience alias used throughout the clusterscan crates.
pub type ScanResult<T> = Result<T, ScanError>;
