//! Release search across providers.

mod dedup;
mod jackett;
mod orchestrator;
mod types;

pub use dedup::{compare_for_dedup, dedup_decisions};
pub use jackett::JackettProvider;
pub use orchestrator::{SearchOrchestrator, SearchSettings};
pub use types::*;
