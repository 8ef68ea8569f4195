//! Decision and specification types.

use serde::{Deserialize, Serialize};

use crate::candidate::RemoteCandidate;
use crate::search::SearchCriteria;

/// Whether a rejection can go away on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    Permanent,
    /// May be accepted later (e.g. after a delay or when state changes).
    Temporary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub kind: RejectionKind,
}

impl Rejection {
    pub fn permanent(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            kind: RejectionKind::Permanent,
        }
    }

    pub fn temporary(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            kind: RejectionKind::Temporary,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Result of a single specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(Rejection),
}

impl Verdict {
    pub fn reject(reason: impl Into<String>) -> Self {
        Verdict::Reject(Rejection::permanent(reason))
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Evaluation order bucket. Cheaper buckets run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecificationPriority {
    Parsing,
    Default,
    Database,
    Expensive,
}

/// A single accept/reject rule.
///
/// Implementations are pure: they must not mutate the candidate or any
/// external state.
pub trait DecisionSpecification: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Default
    }

    fn evaluate(&self, candidate: &RemoteCandidate, criteria: &SearchCriteria) -> Verdict;
}

/// A candidate together with every rejection raised against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub candidate: RemoteCandidate,
    #[serde(default)]
    pub rejections: Vec<Rejection>,
}

impl Decision {
    pub fn new(candidate: RemoteCandidate, rejections: Vec<Rejection>) -> Self {
        Self {
            candidate,
            rejections,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.rejections.is_empty()
    }

    /// Rejected only for reasons that may clear later.
    pub fn is_temporarily_rejected(&self) -> bool {
        !self.rejections.is_empty()
            && self
                .rejections
                .iter()
                .all(|r| r.kind == RejectionKind::Temporary)
    }

    pub fn guid(&self) -> &str {
        &self.candidate.release.guid
    }
}
