//! Specification-based release decisions.
//!
//! A [`DecisionPipeline`] runs an ordered set of [`DecisionSpecification`]s
//! against each [`RemoteCandidate`](crate::candidate::RemoteCandidate). Every
//! specification runs, so a [`Decision`] always carries the complete set of
//! rejections.

mod pipeline;
mod ranking;
mod size;
pub mod specs;
mod types;

pub use pipeline::DecisionPipeline;
pub use ranking::{compare_decisions, prioritize_decisions};
pub use size::{check_size, SizeContext};
pub use types::*;
