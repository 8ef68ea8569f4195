//! Resolution of parsed releases to library entities.

use std::sync::Arc;

use tracing::debug;

use crate::library::{Episode, LibraryError, LibraryLookup, Series};
use crate::parser::{clean_title, parse_movie_title, ParsedReleaseInfo, ReleaseNumbering};
use crate::search::{SearchCriteria, SearchKind};

use super::{LibraryMatch, LibraryReference};

/// True when any parsed title cleans to any acceptable title.
pub(crate) fn titles_match<'a>(
    parsed_titles: &[String],
    acceptable: impl IntoIterator<Item = &'a str>,
) -> bool {
    let acceptable: Vec<String> = acceptable
        .into_iter()
        .map(clean_title)
        .filter(|t| !t.is_empty())
        .collect();
    parsed_titles
        .iter()
        .map(|t| clean_title(t))
        .any(|t| acceptable.contains(&t))
}

/// Maps parsed releases onto library series, episodes and movies.
pub struct CandidateMapper {
    library: Arc<dyn LibraryLookup>,
}

impl CandidateMapper {
    pub fn new(library: Arc<dyn LibraryLookup>) -> Self {
        Self { library }
    }

    /// Load the episode list a search target's releases are resolved against.
    pub fn episodes_for_search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Episode>, LibraryError> {
        match criteria.series() {
            Some(series) => self.library.episodes_for_series(series.id),
            None => Ok(Vec::new()),
        }
    }

    /// Map a release found by a search. The series or movie comes from the
    /// criteria; title agreement is checked by the decision pipeline.
    pub fn map_for_search(
        &self,
        parsed: &ParsedReleaseInfo,
        criteria: &SearchCriteria,
        series_episodes: &[Episode],
    ) -> LibraryReference {
        match &criteria.kind {
            SearchKind::SingleItem { series, .. } | SearchKind::Season { series, .. } => {
                map_episodes(parsed, series, series_episodes)
            }
            SearchKind::Movie { movie } => {
                if parsed.numbering.is_some() && !parsed.is_special {
                    LibraryReference::unresolved("release is numbered like an episode")
                } else {
                    LibraryReference::Resolved(LibraryMatch::Movie {
                        movie: movie.clone(),
                    })
                }
            }
        }
    }

    /// Map a release without a known target, by title lookup.
    pub fn map(&self, parsed: &ParsedReleaseInfo) -> Result<LibraryReference, LibraryError> {
        if parsed.numbering.is_none() {
            return self.map_movie(parsed);
        }

        for title in &parsed.titles {
            if let Some(series) = self.library.find_series_by_title(&clean_title(title))? {
                let episodes = self.library.episodes_for_series(series.id)?;
                return Ok(map_episodes(parsed, &series, &episodes));
            }
        }

        // "Room.237.1080p" reads as S02E37 until no series claims it.
        if parsed.scene_numbered {
            if let Ok(movie_parse) = parse_movie_title(&parsed.release_title) {
                if let LibraryReference::Resolved(found) = self.map_movie(&movie_parse)? {
                    return Ok(LibraryReference::Resolved(found));
                }
            }
        }
        Ok(LibraryReference::unresolved("no series matches the release title"))
    }

    fn map_movie(&self, parsed: &ParsedReleaseInfo) -> Result<LibraryReference, LibraryError> {
        for title in &parsed.titles {
            if let Some(movie) = self
                .library
                .find_movie_by_title(&clean_title(title), parsed.year)?
            {
                return Ok(LibraryReference::Resolved(LibraryMatch::Movie { movie }));
            }
        }
        Ok(LibraryReference::unresolved("no movie matches the release title"))
    }

    /// Map a release against a known series. The release title must still
    /// name that series.
    pub fn map_to_series(
        &self,
        parsed: &ParsedReleaseInfo,
        series_id: i64,
    ) -> Result<LibraryReference, LibraryError> {
        let Some(series) = self.library.series(series_id)? else {
            return Ok(LibraryReference::unresolved(format!(
                "series {} is not in the library",
                series_id
            )));
        };
        if !titles_match(&parsed.titles, series.all_titles().map(String::as_str)) {
            return Ok(LibraryReference::unresolved(format!(
                "release title does not name series '{}'",
                series.title
            )));
        }
        let episodes = self.library.episodes_for_series(series.id)?;
        Ok(map_episodes(parsed, &series, &episodes))
    }
}

/// Resolve a parsed numbering to episodes of `series`.
pub(crate) fn map_episodes(
    parsed: &ParsedReleaseInfo,
    series: &Series,
    episodes: &[Episode],
) -> LibraryReference {
    let Some(numbering) = &parsed.numbering else {
        return LibraryReference::unresolved("release has no episode numbering");
    };

    let mut matched: Vec<Episode> = match numbering {
        ReleaseNumbering::AirDate { date, part } => {
            let on_date: Vec<&Episode> = episodes
                .iter()
                .filter(|e| e.air_date == Some(*date))
                .collect();
            match part {
                Some(part) if on_date.len() > 1 => on_date
                    .get((*part as usize).saturating_sub(1))
                    .map(|e| vec![(*e).clone()])
                    .unwrap_or_default(),
                _ => on_date.into_iter().cloned().collect(),
            }
        }
        ReleaseNumbering::SeasonEpisode {
            season,
            episodes: numbers,
        } => episodes
            .iter()
            .filter(|e| {
                e.season_number == *season
                    && (numbers.is_empty() || numbers.contains(&e.episode_number))
            })
            .cloned()
            .collect(),
        ReleaseNumbering::Absolute { episodes: numbers } => episodes
            .iter()
            .filter(|e| e.absolute_number.is_some_and(|n| numbers.contains(&n)))
            .cloned()
            .collect(),
        ReleaseNumbering::Special { title } => match_special(title, episodes),
    };

    if matched.is_empty() {
        debug!(
            series = %series.title,
            numbering = numbering.kind(),
            "No library episodes match release numbering"
        );
        return LibraryReference::unresolved(format!(
            "no episodes of '{}' match the release numbering",
            series.title
        ));
    }

    matched.sort_by_key(|e| (e.season_number, e.episode_number));
    LibraryReference::Resolved(LibraryMatch::Episodes {
        series: series.clone(),
        episodes: matched,
    })
}

/// Episodes named by a special: by item title first, then by a single
/// unambiguous performer match.
fn match_special(name: &str, episodes: &[Episode]) -> Vec<Episode> {
    let clean_name = clean_title(name);
    if clean_name.is_empty() {
        return Vec::new();
    }

    let by_title: Vec<Episode> = episodes
        .iter()
        .filter(|e| clean_title(&e.title) == clean_name)
        .cloned()
        .collect();
    if !by_title.is_empty() {
        return by_title;
    }

    let by_performer: Vec<&Episode> = episodes
        .iter()
        .filter(|e| e.performers.iter().any(|p| clean_title(p) == clean_name))
        .collect();
    match by_performer.as_slice() {
        [only] => vec![(*only).clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_title;
    use chrono::NaiveDate;

    fn series() -> Series {
        Series::new(1, "Show").with_runtime(30)
    }

    fn library_episodes() -> Vec<Episode> {
        vec![
            Episode::new(11, 1, 1, 1).with_absolute_number(1),
            Episode::new(12, 1, 1, 2).with_absolute_number(2),
            Episode::new(13, 1, 1, 3)
                .with_absolute_number(3)
                .with_air_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            Episode::new(21, 1, 2, 1)
                .with_title("Behind The Scenes")
                .with_performers(vec!["Jane Doe".to_string()]),
        ]
    }

    fn resolved_ids(reference: &LibraryReference) -> Vec<i64> {
        match reference.resolved() {
            Some(LibraryMatch::Episodes { episodes, .. }) => episodes.iter().map(|e| e.id).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_map_season_episode() {
        let parsed = parse_title("Show.S01E02.720p.HDTV").unwrap();
        let reference = map_episodes(&parsed, &series(), &library_episodes());
        assert_eq!(resolved_ids(&reference), vec![12]);
    }

    #[test]
    fn test_map_season_pack() {
        let parsed = parse_title("Show.S01.720p.HDTV").unwrap();
        let reference = map_episodes(&parsed, &series(), &library_episodes());
        assert_eq!(resolved_ids(&reference), vec![11, 12, 13]);
    }

    #[test]
    fn test_map_absolute_and_date() {
        let parsed = parse_title("[Group] Show - 02 [720p]").unwrap();
        assert_eq!(
            resolved_ids(&map_episodes(&parsed, &series(), &library_episodes())),
            vec![12]
        );

        let parsed = parse_title("Show.2024.01.15.720p").unwrap();
        assert_eq!(
            resolved_ids(&map_episodes(&parsed, &series(), &library_episodes())),
            vec![13]
        );
    }

    #[test]
    fn test_map_special_by_title_and_performer() {
        let by_title = match_special("Behind the Scenes", &library_episodes());
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, 21);

        let by_performer = match_special("Jane Doe", &library_episodes());
        assert_eq!(by_performer.len(), 1);
        assert_eq!(by_performer[0].id, 21);
    }

    #[test]
    fn test_unmatched_numbering_is_unresolved() {
        let parsed = parse_title("Show.S05E01.720p").unwrap();
        let reference = map_episodes(&parsed, &series(), &library_episodes());
        assert!(!reference.is_resolved());

        let parsed = parse_title("Show 720p").unwrap();
        let reference = map_episodes(&parsed, &series(), &library_episodes());
        assert!(!reference.is_resolved());
    }

    #[test]
    fn test_scene_numbered_title_falls_back_to_movie() {
        use crate::library::Movie;
        use crate::testing::InMemoryLibrary;

        let library = Arc::new(InMemoryLibrary::new());
        library.add_movie(Movie::new(7, "Room 237", Some(2012)));
        let mapper = CandidateMapper::new(library as Arc<dyn LibraryLookup>);

        let parsed = parse_title("Room.237.1080p.BluRay").unwrap();
        assert!(parsed.scene_numbered);
        match mapper.map(&parsed).unwrap().resolved() {
            Some(LibraryMatch::Movie { movie }) => assert_eq!(movie.id, 7),
            other => panic!("expected movie match, got {:?}", other),
        }

        let parsed = parse_title("Unknown.Show.S01E01.720p").unwrap();
        assert!(!mapper.map(&parsed).unwrap().is_resolved());
    }

    #[test]
    fn test_titles_match() {
        let titles = vec!["The.Office.US".to_string()];
        assert!(titles_match(&titles, ["The Office (US)"]));
        assert!(!titles_match(&titles, ["The Office UK"]));
        assert!(!titles_match(&titles, [""]));
    }
}
