//! Ordering of decisions, best first.

use std::cmp::{Ordering, Reverse};

use super::Decision;

/// Total order used to rank decisions: accepted first, then higher quality
/// and revision, preferred provider, more seeders, newer, and finally guid.
pub fn compare_decisions(a: &Decision, b: &Decision) -> Ordering {
    let ra = &a.candidate.release;
    let rb = &b.candidate.release;
    let qa = &a.candidate.parsed.quality;
    let qb = &b.candidate.parsed.quality;

    b.is_accepted()
        .cmp(&a.is_accepted())
        .then_with(|| qb.quality.weight().cmp(&qa.quality.weight()))
        .then_with(|| qb.revision.cmp(&qa.revision))
        .then_with(|| ra.effective_priority().cmp(&rb.effective_priority()))
        .then_with(|| rb.seeders.unwrap_or(0).cmp(&ra.seeders.unwrap_or(0)))
        .then_with(|| Reverse(ra.publish_date).cmp(&Reverse(rb.publish_date)))
        .then_with(|| ra.guid.cmp(&rb.guid))
}

/// Sort decisions best first.
pub fn prioritize_decisions(mut decisions: Vec<Decision>) -> Vec<Decision> {
    decisions.sort_by(compare_decisions);
    decisions
}
