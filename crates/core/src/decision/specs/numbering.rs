use crate::candidate::RemoteCandidate;
use crate::decision::{DecisionSpecification, Verdict};
use crate::search::{SearchCriteria, SearchKind};

/// Rejects releases that do not cover the searched item(s).
pub struct NumberingMatchSpecification;

impl DecisionSpecification for NumberingMatchSpecification {
    fn name(&self) -> &'static str {
        "numbering_match"
    }

    fn evaluate(&self, candidate: &RemoteCandidate, criteria: &SearchCriteria) -> Verdict {
        if !candidate.reference.is_resolved() {
            return Verdict::Accept;
        }

        let covered = candidate.episodes();
        match &criteria.kind {
            SearchKind::SingleItem { item, .. } => {
                if covered.iter().any(|e| e.id == item.id) {
                    Verdict::Accept
                } else {
                    Verdict::reject(format!(
                        "Release does not contain S{:02}E{:02}",
                        item.season_number, item.episode_number
                    ))
                }
            }
            SearchKind::Season {
                items,
                season_number,
                ..
            } => {
                if candidate.parsed.season_number().is_some_and(|s| s != *season_number) {
                    return Verdict::reject(format!(
                        "Wrong season: release is not season {}",
                        season_number
                    ));
                }
                if covered.iter().any(|e| items.iter().any(|i| i.id == e.id)) {
                    Verdict::Accept
                } else {
                    Verdict::reject(format!(
                        "Release contains no wanted episodes of season {}",
                        season_number
                    ))
                }
            }
            SearchKind::Movie { .. } => Verdict::Accept,
        }
    }
}
