//! Ordered evaluation of decision specifications.

use std::sync::Arc;

use tracing::debug;

use crate::candidate::RemoteCandidate;
use crate::metrics::{DECISIONS_TOTAL, REJECTIONS_TOTAL};
use crate::quality::QualityDefinitionLookup;
use crate::search::SearchCriteria;

use super::specs::default_specifications;
use super::{Decision, DecisionSpecification, Verdict};

/// Runs every specification against a candidate and collects all rejections.
pub struct DecisionPipeline {
    specifications: Vec<Box<dyn DecisionSpecification>>,
}

impl DecisionPipeline {
    /// Build a pipeline. Specifications are ordered by priority once, keeping
    /// registration order within a priority.
    pub fn new(mut specifications: Vec<Box<dyn DecisionSpecification>>) -> Self {
        specifications.sort_by_key(|s| s.priority());
        Self { specifications }
    }

    pub fn with_default_specifications(definitions: Arc<dyn QualityDefinitionLookup>) -> Self {
        Self::new(default_specifications(definitions))
    }

    /// Names in evaluation order.
    pub fn specification_names(&self) -> Vec<&'static str> {
        self.specifications.iter().map(|s| s.name()).collect()
    }

    pub fn evaluate(&self, candidate: RemoteCandidate, criteria: &SearchCriteria) -> Decision {
        let mut rejections = Vec::new();

        for spec in &self.specifications {
            if let Verdict::Reject(rejection) = spec.evaluate(&candidate, criteria) {
                debug!(
                    specification = spec.name(),
                    release = %candidate.release.title,
                    reason = %rejection.reason,
                    "Release rejected"
                );
                REJECTIONS_TOTAL.with_label_values(&[spec.name()]).inc();
                rejections.push(rejection);
            }
        }

        let result = if rejections.is_empty() {
            "accepted"
        } else {
            "rejected"
        };
        DECISIONS_TOTAL.with_label_values(&[result]).inc();

        Decision::new(candidate, rejections)
    }
}
