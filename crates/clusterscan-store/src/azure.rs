//! Azure Blob Storage over plain HTTPS.
//!
//! Every object is a single `Put Blob` request against
//! `{storageBaseUrl}/{key}?{sasToken}`. The SAS token is used as issued; it is
//! never refreshed or inspected here.

use std::{thread, time::Duration};

use reqwest::{blocking::Client, header::CONTENT_TYPE};
use tracing::{debug, warn};

use clusterscan_contracts::error::{ScanError, ScanResult};
use clusterscan_core::traits::ObjectStore;

/// Upper bound on a single object write.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Delay before the first retry; doubles on every further attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(10);

const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";

/// A block-blob container addressed by URL and SAS token.
#[derive(Debug, Clone)]
pub struct AzureBlobStore {
    client: Client,
    base_url: String,
    sas_token: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl AzureBlobStore {
    /// Build a store for the container at `base_url`.
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, sas_token: impl Into<String>) -> ScanResult<Self> {
        Ok(Self {
            client: build_client(UPLOAD_TIMEOUT)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sas_token: sas_token.into().trim_start_matches('?').to_string(),
            max_retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        })
    }

    /// Bound each write by `timeout` instead of `UPLOAD_TIMEOUT`.
    pub fn with_timeout(mut self, timeout: Duration) -> ScanResult<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Retry each failed write up to `max_retries` more times.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// The full request URL for `key`, SAS token included.
    pub fn blob_url(&self, key: &str) -> String {
        if self.sas_token.is_empty() {
            format!("{}/{}", self.base_url, key)
        } else {
            format!("{}/{}?{}", self.base_url, key, self.sas_token)
        }
    }

    fn put_once(&self, key: &str, body: &[u8]) -> ScanResult<()> {
        let response = self
            .client
            .put(self.blob_url(key))
            .header(BLOB_TYPE_HEADER, "BlockBlob")
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ScanError::Timeout { path: key.to_string() }
                } else {
                    // Strip the URL: it carries the SAS token.
                    ScanError::Upload {
                        path: key.to_string(),
                        reason: e.without_url().to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Upload {
                path: key.to_string(),
                reason: format!("blob storage responded with HTTP {status}"),
            });
        }
        Ok(())
    }
}

fn build_client(timeout: Duration) -> ScanResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ScanError::config(format!("failed to create HTTP client: {e}")))
}

impl ObjectStore for AzureBlobStore {
    fn put_object(&self, key: &str, body: &[u8]) -> ScanResult<()> {
        let mut attempt = 0;
        loop {
            match self.put_once(key, body) {
                Ok(()) => {
                    debug!(key = %key, bytes = body.len(), attempt, "blob written");
                    return Ok(());
                }
                Err(e) if attempt < self.max_retries => {
                    let delay = self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt));
                    warn!(key = %key, error = %e, attempt, ?delay, "blob write failed, retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
