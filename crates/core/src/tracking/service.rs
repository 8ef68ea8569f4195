//! Correlation of download-client items with the library.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::candidate::{map_episodes, CandidateMapper, LibraryMatchRef, LibraryReference};
use crate::history::{HistoryLookup, HistoryRecord};
use crate::library::{Episode, LibraryItemKey, LibraryLookup};
use crate::metrics::{PARSE_FAILURES, TRACKED_MATCHES, TRACKED_ORPHANED};
use crate::parser::{parse_special_title, parse_title, SpecialContext};

use super::{
    DownloadClientInfo, DownloadClientItem, LibraryChangeEvent, TrackedDownload,
    TrackedDownloadState, TrackedDownloadStore, TrackingError,
};

struct MatchOutcome {
    matched: Option<LibraryMatchRef>,
    source_title: Option<String>,
    method: &'static str,
}

/// Tracks download-client items and keeps their library matches current.
pub struct TrackedDownloadService {
    store: Arc<dyn TrackedDownloadStore>,
    history: Arc<dyn HistoryLookup>,
    library: Arc<dyn LibraryLookup>,
    mapper: CandidateMapper,
}

impl TrackedDownloadService {
    pub fn new(
        store: Arc<dyn TrackedDownloadStore>,
        history: Arc<dyn HistoryLookup>,
        library: Arc<dyn LibraryLookup>,
    ) -> Self {
        Self {
            store,
            history,
            mapper: CandidateMapper::new(Arc::clone(&library)),
            library,
        }
    }

    /// Observe a client item and (re)match it against the library.
    ///
    /// Matching tries, in order: the history record's source title, the
    /// source title and client title as specials of the recorded series, and
    /// finally the client title on its own. No match is a valid result.
    pub fn track(
        &self,
        client: &DownloadClientInfo,
        item: &DownloadClientItem,
    ) -> Result<TrackedDownload, TrackingError> {
        let existing = self.store.get(&item.download_id)?;
        let outcome = self.match_item(item)?;
        TRACKED_MATCHES.with_label_values(&[outcome.method]).inc();

        let now = Utc::now();
        let state = match &existing {
            Some(previous) if previous.state.is_sticky() => previous.state,
            _ => TrackedDownloadState::from_status(item.status),
        };

        let tracked = TrackedDownload {
            download_id: item.download_id.clone(),
            client: client.clone(),
            title: item.title.clone(),
            state,
            matched: outcome.matched,
            source_title: outcome.source_title,
            first_seen_at: existing.map(|e| e.first_seen_at).unwrap_or(now),
            updated_at: now,
        };
        self.store.upsert(&tracked)?;

        debug!(
            download_id = %tracked.download_id,
            client = %client.name,
            state = tracked.state.as_str(),
            method = outcome.method,
            matched = tracked.matched.is_some(),
            "Tracked download updated"
        );

        Ok(tracked)
    }

    /// Clear matches orphaned by a library deletion. Returns how many
    /// tracked downloads lost their match.
    pub fn reconcile(&self, event: &LibraryChangeEvent) -> Result<usize, TrackingError> {
        let cleared = self
            .store
            .clear_matches(&|matched: &LibraryMatchRef| event.affects(matched))?;

        if cleared > 0 {
            TRACKED_ORPHANED.inc_by(cleared as u64);
            info!(
                event = event.kind(),
                cleared = cleared,
                "Tracked downloads unmatched after library deletion"
            );
        }

        Ok(cleared)
    }

    pub fn tracked_downloads(&self) -> Result<Vec<TrackedDownload>, TrackingError> {
        Ok(self.store.list()?)
    }

    pub fn get(&self, download_id: &str) -> Result<Option<TrackedDownload>, TrackingError> {
        Ok(self.store.get(download_id)?)
    }

    fn match_item(&self, item: &DownloadClientItem) -> Result<MatchOutcome, TrackingError> {
        let history = self.history.find_by_download_id(&item.download_id)?;
        let source_title = history.first().map(|r| r.source_title.clone());

        if let Some(record) = history.first() {
            if let Some((matched, method)) = self.match_from_history(record, &history, item)? {
                return Ok(MatchOutcome {
                    matched: Some(matched),
                    source_title,
                    method,
                });
            }
        }

        match parse_title(&item.title) {
            Ok(parsed) => {
                if let LibraryReference::Resolved(found) = self.mapper.map(&parsed)? {
                    return Ok(MatchOutcome {
                        matched: Some(found.to_ref()),
                        source_title,
                        method: "client_title",
                    });
                }
            }
            Err(failure) => {
                debug!(
                    download_id = %item.download_id,
                    reason = failure.reason.as_str(),
                    "Client title could not be parsed"
                );
                PARSE_FAILURES
                    .with_label_values(&["tracking", failure.reason.as_str()])
                    .inc();
            }
        }

        Ok(MatchOutcome {
            matched: None,
            source_title,
            method: "unmatched",
        })
    }

    /// Match through the newest history record. The result must point at the
    /// same series or movie the record was grabbed for.
    fn match_from_history(
        &self,
        record: &HistoryRecord,
        records: &[HistoryRecord],
        item: &DownloadClientItem,
    ) -> Result<Option<(LibraryMatchRef, &'static str)>, TrackingError> {
        match record.item {
            LibraryItemKey::Movie(movie_id) => {
                let Ok(parsed) = parse_title(&record.source_title) else {
                    return Ok(None);
                };
                let matched = self
                    .mapper
                    .map(&parsed)?
                    .resolved()
                    .map(|m| m.to_ref())
                    .filter(|m| m.references_movie(movie_id));
                Ok(matched.map(|m| (m, "history")))
            }
            LibraryItemKey::Episode(_) => {
                let Some(series_id) = record.series_id else {
                    return Ok(None);
                };
                match parse_title(&record.source_title) {
                    Ok(parsed) if parsed.numbering.is_some() => {
                        let reference = self.mapper.map_to_series(&parsed, series_id)?;
                        Ok(same_series(&reference, series_id).map(|m| (m, "history")))
                    }
                    _ => self.match_special(record, records, series_id, item),
                }
            }
        }
    }

    /// Retry the source title, then the client title, as specials of the
    /// recorded series. Resolution is limited to the episodes named by the
    /// history records.
    fn match_special(
        &self,
        record: &HistoryRecord,
        records: &[HistoryRecord],
        series_id: i64,
        item: &DownloadClientItem,
    ) -> Result<Option<(LibraryMatchRef, &'static str)>, TrackingError> {
        let Some(series) = self.library.series(series_id)? else {
            return Ok(None);
        };
        let episodes = self.library.episodes_for_series(series_id)?;

        // Only the episodes the history was grabbed for are candidates.
        let recorded: Vec<Episode> = episodes
            .into_iter()
            .filter(|e| {
                records
                    .iter()
                    .any(|r| r.item == LibraryItemKey::Episode(e.id))
            })
            .collect();
        if recorded.is_empty() {
            return Ok(None);
        }
        let context = SpecialContext::new(series.all_titles().cloned().collect())
            .with_item_titles(
                recorded
                    .iter()
                    .map(|e| e.title.clone())
                    .filter(|t| !t.is_empty())
                    .collect(),
            )
            .with_performers(
                recorded
                    .iter()
                    .flat_map(|e| e.performers.iter().cloned())
                    .collect(),
            );

        let attempts = [
            (record.source_title.as_str(), "history_special"),
            (item.title.as_str(), "client_special"),
        ];
        for (title, method) in attempts {
            let Ok(parsed) = parse_special_title(title, &context) else {
                continue;
            };
            let reference = map_episodes(&parsed, &series, &recorded);
            if let Some(matched) = same_series(&reference, series_id) {
                return Ok(Some((matched, method)));
            }
        }

        Ok(None)
    }
}

fn same_series(reference: &LibraryReference, series_id: i64) -> Option<LibraryMatchRef> {
    reference
        .resolved()
        .map(|m| m.to_ref())
        .filter(|m| m.references_series(series_id))
}
