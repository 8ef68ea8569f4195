//! Download history lookup.
//!
//! History records tie an external download id to the title the release was
//! grabbed under and the library item it was grabbed for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::{LibraryError, LibraryItemKey};

/// A grab recorded in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub download_id: String,
    /// Release title at grab time.
    pub source_title: String,
    /// Owning series for episode grabs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<i64>,
    pub item: LibraryItemKey,
    pub date: DateTime<Utc>,
}

/// Read access to grab history.
pub trait HistoryLookup: Send + Sync {
    /// Records for a download id, newest first.
    fn find_by_download_id(&self, download_id: &str) -> Result<Vec<HistoryRecord>, LibraryError>;
}
