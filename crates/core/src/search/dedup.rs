//! Deduplication of evaluated releases by guid.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::decision::Decision;
use crate::metrics::DUPLICATES_DROPPED;

/// Preference between two decisions for the same guid. `Less` wins.
///
/// Fewest rejections first, then lowest provider priority. Every other
/// reported field breaks the remaining ties so the winner never depends on
/// arrival order: more seeders and a newer publish date are preferred.
pub fn compare_for_dedup(a: &Decision, b: &Decision) -> Ordering {
    let ra = &a.candidate.release;
    let rb = &b.candidate.release;

    a.rejections
        .len()
        .cmp(&b.rejections.len())
        .then_with(|| ra.effective_priority().cmp(&rb.effective_priority()))
        .then_with(|| ra.provider.cmp(&rb.provider))
        .then_with(|| ra.title.cmp(&rb.title))
        .then_with(|| ra.size.cmp(&rb.size))
        .then_with(|| ra.download_url.cmp(&rb.download_url))
        .then_with(|| rb.seeders.cmp(&ra.seeders))
        .then_with(|| rb.publish_date.cmp(&ra.publish_date))
        .then_with(|| ra.info_url.cmp(&rb.info_url))
}

/// Keep one decision per guid.
///
/// The output is ordered by guid and is the same for any permutation of the
/// input. Applying it twice changes nothing.
pub fn dedup_decisions(decisions: Vec<Decision>) -> Vec<Decision> {
    let total = decisions.len();
    let mut by_guid: BTreeMap<String, Decision> = BTreeMap::new();

    for decision in decisions {
        match by_guid.get_mut(decision.guid()) {
            Some(existing) => {
                if compare_for_dedup(&decision, existing) == Ordering::Less {
                    *existing = decision;
                }
            }
            None => {
                by_guid.insert(decision.guid().to_string(), decision);
            }
        }
    }

    let dropped = total - by_guid.len();
    if dropped > 0 {
        DUPLICATES_DROPPED.inc_by(dropped as u64);
    }

    by_guid.into_values().collect()
}
