//! Built-in decision specifications.

mod monitored;
mod numbering;
mod parsing;
mod quality;
mod sample;

pub use monitored::MonitoredSpecification;
pub use numbering::NumberingMatchSpecification;
pub use parsing::{LibraryResolvedSpecification, TitleMatchSpecification};
pub use quality::{AcceptableSizeSpecification, QualityAllowedSpecification};
pub use sample::SampleSpecification;

use std::sync::Arc;

use crate::quality::QualityDefinitionLookup;

use super::DecisionSpecification;

/// The default specification set, in registration order.
pub fn default_specifications(
    definitions: Arc<dyn QualityDefinitionLookup>,
) -> Vec<Box<dyn DecisionSpecification>> {
    vec![
        Box::new(LibraryResolvedSpecification),
        Box::new(TitleMatchSpecification),
        Box::new(NumberingMatchSpecification),
        Box::new(MonitoredSpecification),
        Box::new(QualityAllowedSpecification),
        Box::new(SampleSpecification),
        Box::new(AcceptableSizeSpecification::new(definitions)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{map_episodes, LibraryMatch, LibraryReference, RemoteCandidate};
    use crate::decision::Verdict;
    use crate::library::{Episode, Movie, Series};
    use crate::parser::parse_title;
    use crate::quality::{Quality, QualityDefinition, StaticQualityDefinitions};
    use crate::search::{Release, SearchCriteria, SearchHints};

    const MB: u64 = 1_048_576;

    fn series() -> Series {
        Series::new(1, "Show").with_runtime(30)
    }

    fn episodes() -> Vec<Episode> {
        vec![
            Episode::new(11, 1, 1, 1),
            Episode::new(12, 1, 1, 2),
            Episode::new(21, 1, 2, 1),
        ]
    }

    fn single_criteria(series: Series, episode: Episode) -> SearchCriteria {
        SearchCriteria::single_item(series, episode, SearchHints::default())
    }

    fn candidate(title: &str, size_mb: u64, series: &Series, episodes: &[Episode]) -> RemoteCandidate {
        let parsed = parse_title(title).unwrap();
        let reference = map_episodes(&parsed, series, episodes);
        RemoteCandidate::new(Release::new("guid", title, size_mb * MB), parsed, reference)
    }

    #[test]
    fn test_library_resolved() {
        let criteria = single_criteria(series(), episodes()[0].clone());
        let c = candidate("Show.S09E01.720p.HDTV", 300, &series(), &episodes());
        assert!(!LibraryResolvedSpecification.evaluate(&c, &criteria).is_accept());
        let c = candidate("Show.S01E01.720p.HDTV", 300, &series(), &episodes());
        assert!(LibraryResolvedSpecification.evaluate(&c, &criteria).is_accept());
    }

    #[test]
    fn test_title_match_uses_aliases() {
        let criteria = single_criteria(series(), episodes()[0].clone());
        let c = candidate("Other.Show.S01E01.720p.HDTV", 300, &series(), &episodes());
        assert!(!TitleMatchSpecification.evaluate(&c, &criteria).is_accept());

        let criteria = criteria.with_alias_titles(vec!["Other Show".to_string()]);
        assert!(TitleMatchSpecification.evaluate(&c, &criteria).is_accept());
    }

    #[test]
    fn test_numbering_match_single_and_season() {
        let criteria = single_criteria(series(), episodes()[1].clone());
        let wrong = candidate("Show.S01E01.720p.HDTV", 300, &series(), &episodes());
        let right = candidate("Show.S01E02.720p.HDTV", 300, &series(), &episodes());
        assert!(!NumberingMatchSpecification.evaluate(&wrong, &criteria).is_accept());
        assert!(NumberingMatchSpecification.evaluate(&right, &criteria).is_accept());

        let season = SearchCriteria::season(series(), episodes()[..2].to_vec(), 1).unwrap();
        let pack = candidate("Show.S01.720p.HDTV", 600, &series(), &episodes());
        let other_pack = candidate("Show.S02.720p.HDTV", 600, &series(), &episodes());
        assert!(NumberingMatchSpecification.evaluate(&pack, &season).is_accept());
        assert!(!NumberingMatchSpecification.evaluate(&other_pack, &season).is_accept());
    }

    #[test]
    fn test_monitored_skipped_for_user_searches() {
        let series = series().unmonitored();
        let criteria = single_criteria(series.clone(), episodes()[0].clone());
        let c = candidate("Show.S01E01.720p.HDTV", 300, &series, &episodes());
        assert!(!MonitoredSpecification.evaluate(&c, &criteria).is_accept());

        let criteria = criteria.user_invoked(true);
        assert!(MonitoredSpecification.evaluate(&c, &criteria).is_accept());
    }

    #[test]
    fn test_monitored_rejects_unmonitored_episode() {
        let mut eps = episodes();
        eps[0] = eps[0].clone().unmonitored();
        let criteria = SearchCriteria::season(series(), eps[..2].to_vec(), 1).unwrap();
        let c = candidate("Show.S01.720p.HDTV", 600, &series(), &eps);
        assert!(!MonitoredSpecification.evaluate(&c, &criteria).is_accept());
    }

    #[test]
    fn test_quality_allowed() {
        let series = series().with_allowed_qualities(vec![Quality::WebDl1080p]);
        let criteria = single_criteria(series.clone(), episodes()[0].clone());
        let hdtv = candidate("Show.S01E01.720p.HDTV", 300, &series, &episodes());
        let web = candidate("Show.S01E01.1080p.WEB-DL", 300, &series, &episodes());
        assert!(!QualityAllowedSpecification.evaluate(&hdtv, &criteria).is_accept());
        assert!(QualityAllowedSpecification.evaluate(&web, &criteria).is_accept());
    }

    #[test]
    fn test_sample() {
        let criteria = single_criteria(series(), episodes()[0].clone());
        let c = candidate("Show.S01E01.720p.HDTV.SAMPLE", 30, &series(), &episodes());
        assert!(matches!(
            SampleSpecification.evaluate(&c, &criteria),
            Verdict::Reject(_)
        ));
    }

    #[test]
    fn test_acceptable_size() {
        let defs = Arc::new(StaticQualityDefinitions::new(vec![QualityDefinition::new(
            Quality::Hdtv720p,
            2.0,
            Some(10.0),
        )]));
        let spec = AcceptableSizeSpecification::new(defs);
        let criteria = single_criteria(series(), episodes()[0].clone());

        let ok = candidate("Show.S01E01.720p.HDTV", 250, &series(), &episodes());
        let big = candidate("Show.S01E01.720p.HDTV", 500, &series(), &episodes());
        assert!(spec.evaluate(&ok, &criteria).is_accept());
        assert!(!spec.evaluate(&big, &criteria).is_accept());
    }

    #[test]
    fn test_movie_candidate() {
        let movie = Movie::new(5, "Blade Runner 2049", Some(2017)).with_runtime(160);
        let criteria = SearchCriteria::movie(movie.clone());
        let parsed = parse_title("Blade.Runner.2049.2017.1080p.BluRay.x264-GRP").unwrap();
        let c = RemoteCandidate::new(
            Release::new("g", &parsed.release_title, 8_000 * MB),
            parsed.clone(),
            LibraryReference::Resolved(LibraryMatch::Movie { movie }),
        );
        for spec in default_specifications(Arc::new(StaticQualityDefinitions::with_defaults())) {
            assert!(
                spec.evaluate(&c, &criteria).is_accept(),
                "{} rejected a valid movie",
                spec.name()
            );
        }
    }
}
