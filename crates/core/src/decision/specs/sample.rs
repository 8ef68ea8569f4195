use crate::candidate::RemoteCandidate;
use crate::decision::{DecisionSpecification, Verdict};
use crate::search::SearchCriteria;

/// Rejects sample releases.
pub struct SampleSpecification;

impl DecisionSpecification for SampleSpecification {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn evaluate(&self, candidate: &RemoteCandidate, _criteria: &SearchCriteria) -> Verdict {
        let is_sample = candidate
            .release
            .title
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w.eq_ignore_ascii_case("sample"));
        if is_sample {
            Verdict::reject("Sample release")
        } else {
            Verdict::Accept
        }
    }
}
