//! # clusterscan-store
//!
//! Object store clients for clusterscan.
//!
//! - [`AzureBlobStore`] writes block blobs over HTTPS with a SAS token
//! - [`LocalDirectoryStore`] writes files under a local directory
//! - [`InMemoryObjectStore`] keeps objects in memory, for tests
//!
//! [`open_store`] picks the backend named by the configuration.

pub mod azure;
pub mod local;
pub mod memory;

use tracing::info;

use clusterscan_config::{BlobStorageType, ScannerConfig};
use clusterscan_contracts::error::{ScanError, ScanResult};
use clusterscan_core::traits::ObjectStore;

pub use azure::AzureBlobStore;
pub use local::LocalDirectoryStore;
pub use memory::InMemoryObjectStore;

/// Build the object store selected by `config.blobStorageType`.
pub fn open_store(config: &ScannerConfig) -> ScanResult<Box<dyn ObjectStore>> {
    match config.blob_storage_type {
        BlobStorageType::AzureBlobStorage => {
            let azure = config
                .azure_blob
                .as_ref()
                .ok_or_else(|| ScanError::config("missing config section: azureBlob"))?;
            info!(base_url = %azure.storage_base_url, "using azure blob storage");
            let store = AzureBlobStore::new(&azure.storage_base_url, &azure.sas_token)?
                .with_retries(azure.max_retries, azure::DEFAULT_RETRY_BACKOFF);
            Ok(Box::new(store))
        }
        BlobStorageType::LocalDirectory => {
            let local = config
                .local_directory
                .as_ref()
                .ok_or_else(|| ScanError::config("missing config section: localDirectory"))?;
            info!(path = %local.path.display(), "using local directory storage");
            Ok(Box::new(LocalDirectoryStore::new(&local.path)))
        }
    }
}
