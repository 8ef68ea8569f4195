//! Tracked download types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidate::LibraryMatchRef;
use crate::library::LibraryError;
use crate::search::DownloadProtocol;

/// The download client an item was observed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadClientInfo {
    pub name: String,
    #[serde(default)]
    pub protocol: DownloadProtocol,
}

impl DownloadClientInfo {
    pub fn new(name: impl Into<String>, protocol: DownloadProtocol) -> Self {
        Self {
            name: name.into(),
            protocol,
        }
    }
}

/// Status reported by the download client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadItemStatus {
    Queued,
    Paused,
    Downloading,
    /// Stalled or otherwise degraded but still active.
    Warning,
    Completed,
    Failed,
}

/// An item as reported by a download client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadClientItem {
    /// Client-side id (torrent info hash, nzb id).
    pub download_id: String,
    pub title: String,
    pub status: DownloadItemStatus,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub remaining_size: u64,
}

impl DownloadClientItem {
    pub fn new(
        download_id: impl Into<String>,
        title: impl Into<String>,
        status: DownloadItemStatus,
    ) -> Self {
        Self {
            download_id: download_id.into(),
            title: title.into(),
            status,
            total_size: 0,
            remaining_size: 0,
        }
    }
}

/// Lifecycle state of a tracked download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedDownloadState {
    Downloading,
    ImportPending,
    Imported,
    Failed,
    Ignored,
}

impl TrackedDownloadState {
    pub fn from_status(status: DownloadItemStatus) -> Self {
        match status {
            DownloadItemStatus::Queued
            | DownloadItemStatus::Paused
            | DownloadItemStatus::Downloading
            | DownloadItemStatus::Warning => TrackedDownloadState::Downloading,
            DownloadItemStatus::Completed => TrackedDownloadState::ImportPending,
            DownloadItemStatus::Failed => TrackedDownloadState::Failed,
        }
    }

    /// States set outside the client poll that re-tracking must not undo.
    pub fn is_sticky(&self) -> bool {
        matches!(
            self,
            TrackedDownloadState::Imported | TrackedDownloadState::Ignored
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedDownloadState::Downloading => "downloading",
            TrackedDownloadState::ImportPending => "import_pending",
            TrackedDownloadState::Imported => "imported",
            TrackedDownloadState::Failed => "failed",
            TrackedDownloadState::Ignored => "ignored",
        }
    }
}

/// A download-client item correlated with the library.
///
/// `matched` is `None` when nothing in the library could be identified, or
/// after the matched items were deleted. Records are never removed by
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDownload {
    pub download_id: String,
    pub client: DownloadClientInfo,
    pub title: String,
    pub state: TrackedDownloadState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<LibraryMatchRef>,
    /// Title recorded in history when the release was grabbed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A library deletion that may orphan tracked downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryChangeEvent {
    EpisodesDeleted { episode_ids: Vec<i64> },
    SeriesDeleted { series_id: i64 },
    MovieDeleted { movie_id: i64 },
}

impl LibraryChangeEvent {
    /// True when `matched` references anything this event deletes.
    pub fn affects(&self, matched: &LibraryMatchRef) -> bool {
        match self {
            LibraryChangeEvent::EpisodesDeleted { episode_ids } => {
                matched.references_any_episode(episode_ids)
            }
            LibraryChangeEvent::SeriesDeleted { series_id } => {
                matched.references_series(*series_id)
            }
            LibraryChangeEvent::MovieDeleted { movie_id } => matched.references_movie(*movie_id),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LibraryChangeEvent::EpisodesDeleted { .. } => "episodes_deleted",
            LibraryChangeEvent::SeriesDeleted { .. } => "series_deleted",
            LibraryChangeEvent::MovieDeleted { .. } => "movie_deleted",
        }
    }
}

/// Errors from tracked download storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store lock poisoned: {0}")]
    Lock(String),
}

/// Errors that abort a tracking operation.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_status() {
        assert_eq!(
            TrackedDownloadState::from_status(DownloadItemStatus::Paused),
            TrackedDownloadState::Downloading
        );
        assert_eq!(
            TrackedDownloadState::from_status(DownloadItemStatus::Completed),
            TrackedDownloadState::ImportPending
        );
        assert_eq!(
            TrackedDownloadState::from_status(DownloadItemStatus::Failed),
            TrackedDownloadState::Failed
        );
        assert!(TrackedDownloadState::Ignored.is_sticky());
        assert!(!TrackedDownloadState::Failed.is_sticky());
    }

    #[test]
    fn test_change_event_affects() {
        let episodes = LibraryMatchRef::Episodes {
            series_id: 1,
            episode_ids: vec![10, 11],
        };
        let movie = LibraryMatchRef::Movie { movie_id: 1 };

        let deleted_episode = LibraryChangeEvent::EpisodesDeleted {
            episode_ids: vec![11],
        };
        assert!(deleted_episode.affects(&episodes));
        assert!(!deleted_episode.affects(&movie));

        let deleted_series = LibraryChangeEvent::SeriesDeleted { series_id: 1 };
        assert!(deleted_series.affects(&episodes));
        assert!(!deleted_series.affects(&movie));

        let deleted_movie = LibraryChangeEvent::MovieDeleted { movie_id: 1 };
        assert!(deleted_movie.affects(&movie));
        assert!(!deleted_movie.affects(&episodes));
    }
}
