//! Library lookup abstractions.
//!
//! The library itself (series, episodes, movies and their persistence) lives
//! outside this crate. The core reads it through [`LibraryLookup`] and
//! records search activity through [`LastSearchRecorder`].

mod types;

pub use types::*;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from library collaborators.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library lookup failed: {0}")]
    Lookup(String),

    #[error("Library write failed: {0}")]
    Write(String),
}

/// Read access to library state.
///
/// Title lookups receive titles already normalised with
/// [`crate::parser::clean_title`].
pub trait LibraryLookup: Send + Sync {
    fn series(&self, id: i64) -> Result<Option<Series>, LibraryError>;

    fn episodes_for_series(&self, series_id: i64) -> Result<Vec<Episode>, LibraryError>;

    /// Find a series whose primary or alternate title cleans to `clean_title`.
    fn find_series_by_title(&self, clean_title: &str) -> Result<Option<Series>, LibraryError>;

    fn movie(&self, id: i64) -> Result<Option<Movie>, LibraryError>;

    /// Find a movie by cleaned title; `year` narrows the match when given.
    fn find_movie_by_title(
        &self,
        clean_title: &str,
        year: Option<u16>,
    ) -> Result<Option<Movie>, LibraryError>;
}

/// Records when library items were last searched.
pub trait LastSearchRecorder: Send + Sync {
    fn mark_searched(
        &self,
        items: &[LibraryItemKey],
        searched_at: DateTime<Utc>,
    ) -> Result<(), LibraryError>;
}
