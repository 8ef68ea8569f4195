use crate::candidate::{LibraryMatch, RemoteCandidate};
use crate::decision::{DecisionSpecification, Verdict};
use crate::search::SearchCriteria;

/// Rejects unmonitored targets during automatic searches.
pub struct MonitoredSpecification;

impl DecisionSpecification for MonitoredSpecification {
    fn name(&self) -> &'static str {
        "monitored"
    }

    fn evaluate(&self, candidate: &RemoteCandidate, criteria: &SearchCriteria) -> Verdict {
        if criteria.user_invoked {
            return Verdict::Accept;
        }

        match candidate.reference.resolved() {
            Some(LibraryMatch::Episodes { series, episodes }) => {
                if !series.monitored {
                    return Verdict::reject(format!("Series '{}' is not monitored", series.title));
                }
                match episodes.iter().find(|e| !e.monitored) {
                    Some(e) => Verdict::reject(format!(
                        "Episode S{:02}E{:02} is not monitored",
                        e.season_number, e.episode_number
                    )),
                    None => Verdict::Accept,
                }
            }
            Some(LibraryMatch::Movie { movie }) if !movie.monitored => {
                Verdict::reject(format!("Movie '{}' is not monitored", movie.title))
            }
            _ => Verdict::Accept,
        }
    }
}
