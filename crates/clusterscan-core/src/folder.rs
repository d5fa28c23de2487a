//! Run folder naming.
//!
//! A folder key is `YYYYMMDD-HHMMSS-xxxxxx`: the scan instant at second
//! granularity followed by three random bytes in lowercase hex. Keys sort
//! chronologically; the suffix only separates runs that share a second.

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Produces unique, sortable run folder names.
///
/// The randomness source is supplied by the caller so tests can pin it.
pub struct FolderKeyGenerator {
    rng: Box<dyn RngCore + Send>,
}

impl FolderKeyGenerator {
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// A generator seeded once from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// A reproducible generator for tests and dry runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Build the folder key for `timestamp`.
    pub fn generate(&mut self, timestamp: DateTime<Utc>) -> String {
        let mut suffix = [0u8; 3];
        self.rng.fill_bytes(&mut suffix);
        format!("{}-{}", timestamp.format("%Y%m%d-%H%M%S"), hex::encode(suffix))
    }
}

impl std::fmt::Debug for FolderKeyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderKeyGenerator").finish_non_exhaustive()
    }
}
