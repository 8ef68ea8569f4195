use std::sync::Arc;

use crate::candidate::{LibraryMatch, RemoteCandidate};
use crate::decision::size::{check_size, SizeContext};
use crate::decision::{DecisionSpecification, SpecificationPriority, Verdict};
use crate::quality::QualityDefinitionLookup;
use crate::search::SearchCriteria;

/// Rejects qualities outside the target's allowed set. An empty set allows all.
pub struct QualityAllowedSpecification;

impl DecisionSpecification for QualityAllowedSpecification {
    fn name(&self) -> &'static str {
        "quality_allowed"
    }

    fn evaluate(&self, candidate: &RemoteCandidate, _criteria: &SearchCriteria) -> Verdict {
        let allowed = match candidate.reference.resolved() {
            Some(LibraryMatch::Episodes { series, .. }) => &series.allowed_qualities,
            Some(LibraryMatch::Movie { movie }) => &movie.allowed_qualities,
            None => return Verdict::Accept,
        };

        let quality = candidate.parsed.quality.quality;
        if allowed.is_empty() || allowed.contains(&quality) {
            Verdict::Accept
        } else {
            Verdict::reject(format!("{} is not wanted in profile", quality))
        }
    }
}

/// Rejects releases whose size is implausible for their quality and runtime.
pub struct AcceptableSizeSpecification {
    definitions: Arc<dyn QualityDefinitionLookup>,
}

impl AcceptableSizeSpecification {
    pub fn new(definitions: Arc<dyn QualityDefinitionLookup>) -> Self {
        Self { definitions }
    }
}

impl DecisionSpecification for AcceptableSizeSpecification {
    fn name(&self) -> &'static str {
        "acceptable_size"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Expensive
    }

    fn evaluate(&self, candidate: &RemoteCandidate, _criteria: &SearchCriteria) -> Verdict {
        let Some(context) = SizeContext::for_candidate(candidate) else {
            return Verdict::Accept;
        };
        let definition = self.definitions.get(candidate.parsed.quality.quality);
        check_size(candidate.release.size, &context, &definition)
    }
}
