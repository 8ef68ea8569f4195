//! Tracked download storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::candidate::LibraryMatchRef;

use super::{StoreError, TrackedDownload};

/// Trait for tracked download storage.
///
/// Implementations make each single-record write atomic.
pub trait TrackedDownloadStore: Send + Sync {
    fn get(&self, download_id: &str) -> Result<Option<TrackedDownload>, StoreError>;

    /// Insert or replace the record for `download.download_id`.
    fn upsert(&self, download: &TrackedDownload) -> Result<(), StoreError>;

    /// All records, oldest first.
    fn list(&self) -> Result<Vec<TrackedDownload>, StoreError>;

    /// Set `matched = None` on every record whose match satisfies `predicate`.
    /// Returns the number of records changed.
    fn clear_matches(
        &self,
        predicate: &(dyn Fn(&LibraryMatchRef) -> bool + Sync),
    ) -> Result<usize, StoreError>;
}

/// Process-local store, used in tests and for embedding without a database.
#[derive(Debug, Default)]
pub struct InMemoryTrackedDownloadStore {
    downloads: RwLock<HashMap<String, TrackedDownload>>,
}

impl InMemoryTrackedDownloadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Lock(e.to_string())
}

impl TrackedDownloadStore for InMemoryTrackedDownloadStore {
    fn get(&self, download_id: &str) -> Result<Option<TrackedDownload>, StoreError> {
        let downloads = self.downloads.read().map_err(poisoned)?;
        Ok(downloads.get(download_id).cloned())
    }

    fn upsert(&self, download: &TrackedDownload) -> Result<(), StoreError> {
        let mut downloads = self.downloads.write().map_err(poisoned)?;
        downloads.insert(download.download_id.clone(), download.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<TrackedDownload>, StoreError> {
        let downloads = self.downloads.read().map_err(poisoned)?;
        let mut all: Vec<TrackedDownload> = downloads.values().cloned().collect();
        all.sort_by(|a, b| {
            a.first_seen_at
                .cmp(&b.first_seen_at)
                .then_with(|| a.download_id.cmp(&b.download_id))
        });
        Ok(all)
    }

    fn clear_matches(
        &self,
        predicate: &(dyn Fn(&LibraryMatchRef) -> bool + Sync),
    ) -> Result<usize, StoreError> {
        let mut downloads = self.downloads.write().map_err(poisoned)?;
        let now = Utc::now();
        let mut cleared = 0;
        for download in downloads.values_mut() {
            if download.matched.as_ref().is_some_and(|m| predicate(m)) {
                download.matched = None;
                download.updated_at = now;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}
