//! In-memory implementation of `ObjectStore`.
//!
//! `InMemoryObjectStore` keeps every object in a `BTreeMap` behind an
//! `Arc<Mutex<_>>`. Clones share the same map, so a test can hand one clone
//! to the publisher and inspect the written objects through another.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use clusterscan_contracts::error::{ScanError, ScanResult};
use clusterscan_core::traits::ObjectStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored bytes for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let objects = self.objects.lock().expect("object store lock poisoned");
        objects.get(key).cloned()
    }

    /// All keys, in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        let objects = self.objects.lock().expect("object store lock poisoned");
        objects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().expect("object store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put_object(&self, key: &str, body: &[u8]) -> ScanResult<()> {
        let mut objects = self.objects.lock().map_err(|e| ScanError::Upload {
            path: key.to_string(),
            reason: format!("object store lock poisoned: {e}"),
        })?;
        objects.insert(key.to_string(), body.to_vec());
        Ok(())
    }
}
