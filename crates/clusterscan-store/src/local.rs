//! A store that writes objects as files under a local directory.
//!
//! Keys map to relative paths, so `20240101-000000-0a1b2c/meta` becomes
//! `{root}/20240101-000000-0a1b2c/meta`. Useful for air-gapped runs and for
//! inspecting a backfill before pointing it at real storage.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use clusterscan_contracts::error::{ScanError, ScanResult};
use clusterscan_core::traits::ObjectStore;

#[derive(Debug, Clone)]
pub struct LocalDirectoryStore {
    root: PathBuf,
}

impl LocalDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> ScanResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(ScanError::Upload {
                path: key.to_string(),
                reason: "object key must be a relative path without '..'".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for LocalDirectoryStore {
    fn put_object(&self, key: &str, body: &[u8]) -> ScanResult<()> {
        let path = self.object_path(key)?;
        let io_error = |e: std::io::Error| ScanError::Upload {
            path: key.to_string(),
            reason: format!("{}: {e}", path.display()),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(&path, body).map_err(io_error)?;

        debug!(path = %path.display(), bytes = body.len(), "object written");
        Ok(())
    }
}
