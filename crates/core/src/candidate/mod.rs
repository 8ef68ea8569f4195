//! Mapping parsed releases onto library state.
//!
//! A [`RemoteCandidate`] joins a provider [`Release`] with its parsed title and
//! the library item(s) it resolves to. Resolution failure is an explicit
//! [`LibraryReference::Unresolved`], never a placeholder entity.

mod mapper;

pub use mapper::CandidateMapper;
pub(crate) use mapper::{map_episodes, titles_match};

use serde::{Deserialize, Serialize};

use crate::library::{Episode, LibraryItemKey, Movie, Series};
use crate::parser::ParsedReleaseInfo;
use crate::search::Release;

/// Library entities a release resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryMatch {
    Episodes {
        series: Series,
        episodes: Vec<Episode>,
    },
    Movie {
        movie: Movie,
    },
}

impl LibraryMatch {
    pub fn item_keys(&self) -> Vec<LibraryItemKey> {
        match self {
            LibraryMatch::Episodes { episodes, .. } => episodes.iter().map(Episode::key).collect(),
            LibraryMatch::Movie { movie } => vec![movie.key()],
        }
    }

    pub fn to_ref(&self) -> LibraryMatchRef {
        match self {
            LibraryMatch::Episodes { series, episodes } => LibraryMatchRef::Episodes {
                series_id: series.id,
                episode_ids: episodes.iter().map(|e| e.id).collect(),
            },
            LibraryMatch::Movie { movie } => LibraryMatchRef::Movie { movie_id: movie.id },
        }
    }
}

/// Outcome of mapping a release to the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LibraryReference {
    Resolved(LibraryMatch),
    Unresolved { reason: String },
}

impl LibraryReference {
    pub(crate) fn unresolved(reason: impl Into<String>) -> Self {
        LibraryReference::Unresolved {
            reason: reason.into(),
        }
    }

    pub fn resolved(&self) -> Option<&LibraryMatch> {
        match self {
            LibraryReference::Resolved(m) => Some(m),
            LibraryReference::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LibraryReference::Resolved(_))
    }
}

/// Stored form of a library match: ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryMatchRef {
    Episodes { series_id: i64, episode_ids: Vec<i64> },
    Movie { movie_id: i64 },
}

impl LibraryMatchRef {
    pub fn references_series(&self, id: i64) -> bool {
        matches!(self, LibraryMatchRef::Episodes { series_id, .. } if *series_id == id)
    }

    pub fn references_any_episode(&self, ids: &[i64]) -> bool {
        matches!(self, LibraryMatchRef::Episodes { episode_ids, .. }
            if episode_ids.iter().any(|e| ids.contains(e)))
    }

    pub fn references_movie(&self, id: i64) -> bool {
        matches!(self, LibraryMatchRef::Movie { movie_id } if *movie_id == id)
    }
}

/// A release joined with its parse and library resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCandidate {
    pub release: Release,
    pub parsed: ParsedReleaseInfo,
    pub reference: LibraryReference,
}

impl RemoteCandidate {
    pub fn new(release: Release, parsed: ParsedReleaseInfo, reference: LibraryReference) -> Self {
        Self {
            release,
            parsed,
            reference,
        }
    }

    pub fn series(&self) -> Option<&Series> {
        match self.reference.resolved()? {
            LibraryMatch::Episodes { series, .. } => Some(series),
            LibraryMatch::Movie { .. } => None,
        }
    }

    pub fn episodes(&self) -> &[Episode] {
        match self.reference.resolved() {
            Some(LibraryMatch::Episodes { episodes, .. }) => episodes,
            _ => &[],
        }
    }

    pub fn movie(&self) -> Option<&Movie> {
        match self.reference.resolved()? {
            LibraryMatch::Movie { movie } => Some(movie),
            LibraryMatch::Episodes { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_ref_references() {
        let episodes = LibraryMatchRef::Episodes {
            series_id: 1,
            episode_ids: vec![10, 11],
        };
        assert!(episodes.references_series(1));
        assert!(!episodes.references_series(2));
        assert!(episodes.references_any_episode(&[11, 99]));
        assert!(!episodes.references_any_episode(&[12]));
        assert!(!episodes.references_movie(1));

        let movie = LibraryMatchRef::Movie { movie_id: 7 };
        assert!(movie.references_movie(7));
        assert!(!movie.references_any_episode(&[7]));
    }

    #[test]
    fn test_match_to_ref() {
        let library_match = LibraryMatch::Episodes {
            series: Series::new(1, "Show"),
            episodes: vec![Episode::new(10, 1, 1, 1), Episode::new(11, 1, 1, 2)],
        };
        assert_eq!(
            library_match.to_ref(),
            LibraryMatchRef::Episodes {
                series_id: 1,
                episode_ids: vec![10, 11]
            }
        );
        assert_eq!(
            library_match.item_keys(),
            vec![LibraryItemKey::Episode(10), LibraryItemKey::Episode(11)]
        );
    }
}
