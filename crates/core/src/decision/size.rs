//! Release size bounds derived from runtime and quality definitions.

use tracing::debug;

use crate::candidate::{LibraryMatch, RemoteCandidate};
use crate::quality::QualityDefinition;

use super::Verdict;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Runtime information for the items a release covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeContext {
    /// Runtime in minutes of each covered item; 0 = unknown.
    pub item_runtimes: Vec<u32>,
    /// Series or movie runtime used when an item's own runtime is unknown.
    pub parent_runtime: u32,
    pub is_movie: bool,
}

impl SizeContext {
    pub fn episodes(item_runtimes: Vec<u32>, parent_runtime: u32) -> Self {
        Self {
            item_runtimes,
            parent_runtime,
            is_movie: false,
        }
    }

    pub fn movie(runtime: u32) -> Self {
        Self {
            item_runtimes: vec![runtime],
            parent_runtime: runtime,
            is_movie: true,
        }
    }

    /// Context for a resolved candidate; `None` when unresolved.
    pub fn for_candidate(candidate: &RemoteCandidate) -> Option<Self> {
        match candidate.reference.resolved()? {
            LibraryMatch::Episodes { series, episodes } => Some(Self::episodes(
                episodes.iter().map(|e| e.runtime).collect(),
                series.runtime,
            )),
            LibraryMatch::Movie { movie } => Some(Self::movie(movie.runtime)),
        }
    }

    /// Summed runtime over covered items, with parent fallback.
    pub fn total_runtime(&self) -> u64 {
        if self.item_runtimes.is_empty() {
            return u64::from(self.parent_runtime);
        }
        self.item_runtimes
            .iter()
            .map(|&r| u64::from(if r > 0 { r } else { self.parent_runtime }))
            .sum()
    }
}

fn format_mb(bytes: f64) -> String {
    format!("{:.1} MB", bytes / BYTES_PER_MB)
}

/// Check a release size against the bounds for its quality.
///
/// A size of 0 always passes. With no runtime to go on the release is
/// accepted.
pub fn check_size(size: u64, context: &SizeContext, definition: &QualityDefinition) -> Verdict {
    if size == 0 {
        return Verdict::Accept;
    }

    let runtime = context.total_runtime();
    if runtime == 0 {
        debug!(
            is_movie = context.is_movie,
            quality = %definition.quality,
            "No runtime available, skipping size check"
        );
        return Verdict::Accept;
    }

    let minutes = runtime as f64;
    let size_f = size as f64;

    let min_bytes = definition.min_size_per_minute * minutes * BYTES_PER_MB;
    if size_f < min_bytes {
        return Verdict::reject(format!(
            "{} is smaller than minimum allowed {} for {}",
            format_mb(size_f),
            format_mb(min_bytes),
            definition.quality
        ));
    }

    if let Some(max_per_minute) = definition.max_size_per_minute {
        let max_bytes = max_per_minute * minutes * BYTES_PER_MB;
        if size_f > max_bytes {
            return Verdict::reject(format!(
                "{} is larger than maximum allowed {} for {}",
                format_mb(size_f),
                format_mb(max_bytes),
                definition.quality
            ));
        }
    }

    Verdict::Accept
}
