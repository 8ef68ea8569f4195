//! Structural checks that only need the parse and its library resolution.

use crate::candidate::{titles_match, LibraryReference, RemoteCandidate};
use crate::decision::{DecisionSpecification, SpecificationPriority, Verdict};
use crate::search::SearchCriteria;

/// Rejects candidates that could not be mapped to library items.
pub struct LibraryResolvedSpecification;

impl DecisionSpecification for LibraryResolvedSpecification {
    fn name(&self) -> &'static str {
        "library_resolved"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Parsing
    }

    fn evaluate(&self, candidate: &RemoteCandidate, _criteria: &SearchCriteria) -> Verdict {
        match &candidate.reference {
            LibraryReference::Resolved(_) => Verdict::Accept,
            LibraryReference::Unresolved { reason } => {
                Verdict::reject(format!("Unknown library item: {}", reason))
            }
        }
    }
}

/// Rejects releases whose title names something other than the target.
pub struct TitleMatchSpecification;

impl DecisionSpecification for TitleMatchSpecification {
    fn name(&self) -> &'static str {
        "title_match"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Parsing
    }

    fn evaluate(&self, candidate: &RemoteCandidate, criteria: &SearchCriteria) -> Verdict {
        if titles_match(&candidate.parsed.titles, criteria.acceptable_titles()) {
            Verdict::Accept
        } else {
            Verdict::reject(format!(
                "Wrong title: '{}' does not match '{}'",
                candidate.parsed.primary_title(),
                criteria.query_title()
            ))
        }
    }
}
