//! Testing utilities and in-memory implementations of collaborator traits.
//!
//! These let the search orchestrator and the tracked download service run
//! end to end without an indexer, a library database or a download client.
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_core::testing::{InMemoryLibrary, MockProvider, RecordingSearchRecorder, fixtures};
//!
//! let library = InMemoryLibrary::new();
//! library.add_series(fixtures::series(1, "Show"), vec![fixtures::episode(10, 1, 1, 1)]);
//!
//! let provider = MockProvider::new("indexer-a");
//! provider.set_releases(vec![fixtures::release("g1", "Show.S01E01.720p.HDTV", 500)]).await;
//! ```

mod in_memory_library;
mod mock_provider;

pub use in_memory_library::{InMemoryHistory, InMemoryLibrary, RecordedMark, RecordingSearchRecorder};
pub use mock_provider::MockProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::history::HistoryRecord;
    use crate::library::{Episode, LibraryItemKey, Movie, Series};
    use crate::search::{DownloadProtocol, Release, SearchCriteria, SearchHints};
    use crate::tracking::{DownloadClientInfo, DownloadClientItem, DownloadItemStatus};

    pub const MB: u64 = 1_048_576;

    /// A monitored series with a 30 minute runtime.
    pub fn series(id: i64, title: &str) -> Series {
        Series::new(id, title).with_runtime(30)
    }

    pub fn episode(id: i64, series_id: i64, season: u32, number: u32) -> Episode {
        Episode::new(id, series_id, season, number).with_title(format!("Episode {}", number))
    }

    pub fn movie(id: i64, title: &str, year: u16) -> Movie {
        Movie::new(id, title, Some(year)).with_runtime(120)
    }

    /// A torrent release of `size_mb` megabytes with no provider stamped.
    pub fn release(guid: &str, title: &str, size_mb: u64) -> Release {
        Release::new(guid, title, size_mb * MB)
            .with_download_url(format!("magnet:?xt=urn:btih:{}", guid))
    }

    /// Single-item criteria for S01E01 of series 1 ("Show").
    pub fn episode_criteria() -> SearchCriteria {
        SearchCriteria::single_item(series(1, "Show"), episode(10, 1, 1, 1), SearchHints::default())
    }

    pub fn client_info() -> DownloadClientInfo {
        DownloadClientInfo::new("qbittorrent", DownloadProtocol::Torrent)
    }

    pub fn client_item(download_id: &str, title: &str) -> DownloadClientItem {
        DownloadClientItem::new(download_id, title, DownloadItemStatus::Downloading)
    }

    pub fn history_record(
        download_id: &str,
        source_title: &str,
        series_id: Option<i64>,
        item: LibraryItemKey,
    ) -> HistoryRecord {
        HistoryRecord {
            download_id: download_id.to_string(),
            source_title: source_title.to_string(),
            series_id,
            item,
            date: Utc::now(),
        }
    }
}
