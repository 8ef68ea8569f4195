//! Tracked downloads.
//!
//! Items observed in download clients are matched to library entities and
//! persisted as [`TrackedDownload`] records. Library deletions clear matches
//! through [`TrackedDownloadService::reconcile`] but never remove records.

mod service;
mod sqlite_store;
mod store;
mod types;

pub use service::TrackedDownloadService;
pub use sqlite_store::SqliteTrackedDownloadStore;
pub use store::{InMemoryTrackedDownloadStore, TrackedDownloadStore};
pub use types::*;
