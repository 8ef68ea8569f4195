//! In-memory library, history and last-searched recorder for testing.

use chrono::{DateTime, Utc};
use std::sync::RwLock;

use crate::history::{HistoryLookup, HistoryRecord};
use crate::library::{
    Episode, LastSearchRecorder, LibraryError, LibraryItemKey, LibraryLookup, Movie, Series,
};
use crate::parser::clean_title;

/// Library contents held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    series: RwLock<Vec<Series>>,
    episodes: RwLock<Vec<Episode>>,
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_series(&self, series: Series, episodes: Vec<Episode>) {
        self.series
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(series);
        self.episodes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .extend(episodes);
    }

    pub fn add_movie(&self, movie: Movie) {
        self.movies
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(movie);
    }

    /// Remove a series and its episodes.
    pub fn remove_series(&self, series_id: i64) {
        self.series
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|s| s.id != series_id);
        self.episodes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|e| e.series_id != series_id);
    }

    pub fn remove_episodes(&self, episode_ids: &[i64]) {
        self.episodes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|e| !episode_ids.contains(&e.id));
    }

    pub fn remove_movie(&self, movie_id: i64) {
        self.movies
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|m| m.id != movie_id);
    }
}

fn lookup_failed<T>(e: std::sync::PoisonError<T>) -> LibraryError {
    LibraryError::Lookup(e.to_string())
}

impl LibraryLookup for InMemoryLibrary {
    fn series(&self, id: i64) -> Result<Option<Series>, LibraryError> {
        let series = self.series.read().map_err(lookup_failed)?;
        Ok(series.iter().find(|s| s.id == id).cloned())
    }

    fn episodes_for_series(&self, series_id: i64) -> Result<Vec<Episode>, LibraryError> {
        let episodes = self.episodes.read().map_err(lookup_failed)?;
        Ok(episodes
            .iter()
            .filter(|e| e.series_id == series_id)
            .cloned()
            .collect())
    }

    fn find_series_by_title(&self, clean: &str) -> Result<Option<Series>, LibraryError> {
        let series = self.series.read().map_err(lookup_failed)?;
        Ok(series
            .iter()
            .find(|s| s.all_titles().any(|t| clean_title(t) == clean))
            .cloned())
    }

    fn movie(&self, id: i64) -> Result<Option<Movie>, LibraryError> {
        let movies = self.movies.read().map_err(lookup_failed)?;
        Ok(movies.iter().find(|m| m.id == id).cloned())
    }

    fn find_movie_by_title(
        &self,
        clean: &str,
        year: Option<u16>,
    ) -> Result<Option<Movie>, LibraryError> {
        let movies = self.movies.read().map_err(lookup_failed)?;
        Ok(movies
            .iter()
            .find(|m| {
                clean_title(&m.title) == clean
                    && match (year, m.year) {
                        (Some(wanted), Some(actual)) => wanted == actual,
                        _ => true,
                    }
            })
            .cloned())
    }
}

/// Grab history held in memory.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&self, record: HistoryRecord) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }
}

impl HistoryLookup for InMemoryHistory {
    fn find_by_download_id(&self, download_id: &str) -> Result<Vec<HistoryRecord>, LibraryError> {
        let records = self.records.read().map_err(lookup_failed)?;
        let mut found: Vec<HistoryRecord> = records
            .iter()
            .filter(|r| r.download_id == download_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }
}

/// A recorded `mark_searched` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMark {
    pub items: Vec<LibraryItemKey>,
    pub searched_at: DateTime<Utc>,
}

/// Records "last searched" writes for assertions.
#[derive(Debug, Default)]
pub struct RecordingSearchRecorder {
    marks: RwLock<Vec<RecordedMark>>,
    fail: RwLock<bool>,
}

impl RecordingSearchRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.write().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    pub fn marks(&self) -> Vec<RecordedMark> {
        self.marks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn mark_count(&self) -> usize {
        self.marks.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl LastSearchRecorder for RecordingSearchRecorder {
    fn mark_searched(
        &self,
        items: &[LibraryItemKey],
        searched_at: DateTime<Utc>,
    ) -> Result<(), LibraryError> {
        if *self.fail.read().map_err(|e| LibraryError::Write(e.to_string()))? {
            return Err(LibraryError::Write("recorder unavailable".to_string()));
        }
        self.marks
            .write()
            .map_err(|e| LibraryError::Write(e.to_string()))?
            .push(RecordedMark {
                items: items.to_vec(),
                searched_at,
            });
        Ok(())
    }
}
