//! Fan-out search across providers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::candidate::{CandidateMapper, RemoteCandidate};
use crate::config::SearchConfig;
use crate::decision::{prioritize_decisions, Decision, DecisionPipeline};
use crate::library::{Episode, LastSearchRecorder, LibraryLookup};
use crate::metrics::{
    PARSE_FAILURES, PROVIDER_DURATION, PROVIDER_REQUESTS, RELEASES_FETCHED, SEARCHES_TOTAL,
    SEARCH_DURATION,
};
use crate::parser::{parse_movie_title, parse_title_with_context, SpecialContext};

use super::dedup::dedup_decisions;
use super::{
    ProviderClient, ProviderError, Release, SearchCriteria, SearchError, SearchKind, SearchResult,
};

/// Limits applied to every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub provider_timeout: Duration,
    pub max_concurrent_providers: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            provider_timeout: config.provider_timeout(),
            max_concurrent_providers: config.max_concurrent_providers,
        }
    }
}

type ProviderOutcome = (Arc<dyn ProviderClient>, Result<Vec<Release>, ProviderError>);

/// Queries providers for a search target and turns their releases into
/// ranked decisions.
pub struct SearchOrchestrator {
    providers: Vec<Arc<dyn ProviderClient>>,
    pipeline: Arc<DecisionPipeline>,
    mapper: CandidateMapper,
    recorder: Arc<dyn LastSearchRecorder>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    pub fn new(
        providers: Vec<Arc<dyn ProviderClient>>,
        pipeline: Arc<DecisionPipeline>,
        library: Arc<dyn LibraryLookup>,
        recorder: Arc<dyn LastSearchRecorder>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            providers,
            pipeline,
            mapper: CandidateMapper::new(library),
            recorder,
            settings,
        }
    }

    /// Providers enabled for the search mode whose tags admit the target.
    pub fn eligible_providers(&self, criteria: &SearchCriteria) -> Vec<Arc<dyn ProviderClient>> {
        let target_tags = criteria.target_tags();
        self.providers
            .iter()
            .filter(|provider| {
                let mode_enabled = if criteria.interactive {
                    provider.supports_interactive_search()
                } else {
                    provider.supports_automatic_search()
                };
                let tags = provider.tags();
                let tags_match = tags.is_empty() || tags.iter().any(|t| target_tags.contains(t));
                mode_enabled && tags_match
            })
            .cloned()
            .collect()
    }

    /// Run a search to completion (or per-provider timeout).
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResult, SearchError> {
        self.search_with_cancel(criteria, CancellationToken::new())
            .await
    }

    /// Run a search that stops as soon as `cancel` fires.
    ///
    /// Outstanding provider calls are dropped on cancellation and no item is
    /// marked as searched.
    pub async fn search_with_cancel(
        &self,
        criteria: &SearchCriteria,
        cancel: CancellationToken,
    ) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let kind = criteria.kind_name();

        if let Err(e) = criteria.validate() {
            SEARCHES_TOTAL.with_label_values(&[kind, "invalid"]).inc();
            return Err(e);
        }

        let search_id = Uuid::new_v4();
        let providers = self.eligible_providers(criteria);
        if providers.is_empty() {
            info!(
                search_id = %search_id,
                kind = kind,
                title = %criteria.query_title(),
                "No eligible providers for search"
            );
            SEARCHES_TOTAL.with_label_values(&[kind, "no_providers"]).inc();
            return Ok(SearchResult {
                decisions: Vec::new(),
                providers_queried: Vec::new(),
                provider_errors: HashMap::new(),
                providers_failed: 0,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let series_episodes = self.mapper.episodes_for_search(criteria)?;
        let providers_queried: Vec<String> =
            providers.iter().map(|p| p.name().to_string()).collect();

        debug!(
            search_id = %search_id,
            kind = kind,
            providers = ?providers_queried,
            "Starting provider fan-out"
        );

        let outcomes = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(search_id = %search_id, kind = kind, "Search cancelled");
                SEARCHES_TOTAL.with_label_values(&[kind, "cancelled"]).inc();
                return Err(SearchError::Cancelled);
            }
            outcomes = self.fetch_all(&providers, criteria) => outcomes,
        };

        if let Err(e) = self
            .recorder
            .mark_searched(&criteria.target_items(), Utc::now())
        {
            warn!(search_id = %search_id, error = %e, "Failed to record last search time");
        }

        let mut releases = Vec::new();
        let mut provider_errors: HashMap<String, String> = HashMap::new();
        let mut providers_failed = 0;
        for (provider, result) in outcomes {
            match result {
                Ok(fetched) => {
                    releases.extend(fetched.into_iter().map(|r| stamp_release(r, provider.as_ref())));
                }
                Err(e) => {
                    warn!(provider = %provider.name(), error = %e, "Provider search failed");
                    providers_failed += 1;
                    provider_errors
                        .entry(provider.name().to_string())
                        .and_modify(|existing| {
                            existing.push_str("; ");
                            existing.push_str(&e.to_string());
                        })
                        .or_insert_with(|| e.to_string());
                }
            }
        }
        RELEASES_FETCHED
            .with_label_values(&[])
            .observe(releases.len() as f64);

        let context = special_context(criteria, &series_episodes);
        let decisions: Vec<Decision> = releases
            .into_iter()
            .filter_map(|release| self.evaluate(release, criteria, &context, &series_episodes))
            .collect();
        let decisions = prioritize_decisions(dedup_decisions(decisions));

        let duration = start.elapsed();
        SEARCH_DURATION
            .with_label_values(&[kind])
            .observe(duration.as_secs_f64());

        let outcome = if providers_failed == providers.len() {
            warn!(
                search_id = %search_id,
                kind = kind,
                failed = providers_failed,
                "All providers failed"
            );
            "all_failed"
        } else {
            info!(
                search_id = %search_id,
                kind = kind,
                decisions = decisions.len(),
                accepted = decisions.iter().filter(|d| d.is_accepted()).count(),
                failed_providers = providers_failed,
                duration_ms = duration.as_millis() as u64,
                "Search complete"
            );
            "completed"
        };
        SEARCHES_TOTAL.with_label_values(&[kind, outcome]).inc();

        Ok(SearchResult {
            decisions,
            providers_queried,
            provider_errors,
            providers_failed,
            duration_ms: duration.as_millis() as u64,
        })
    }

    async fn fetch_all(
        &self,
        providers: &[Arc<dyn ProviderClient>],
        criteria: &SearchCriteria,
    ) -> Vec<ProviderOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_providers.max(1)));

        let fetches = providers.iter().map(|provider| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => self.fetch_one(provider.as_ref(), criteria).await,
                    Err(e) => Err(ProviderError::Internal(format!(
                        "Semaphore closed: {}",
                        e
                    ))),
                };
                (Arc::clone(provider), result)
            }
        });

        join_all(fetches).await
    }

    async fn fetch_one(
        &self,
        provider: &dyn ProviderClient,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Release>, ProviderError> {
        let name = provider.name();
        let timer = PROVIDER_DURATION.with_label_values(&[name]).start_timer();

        let result = match tokio::time::timeout(self.settings.provider_timeout, provider.fetch(criteria)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        };
        timer.observe_duration();

        let status = match &result {
            Ok(_) => "success",
            Err(ProviderError::Timeout) => "timeout",
            Err(_) => "error",
        };
        PROVIDER_REQUESTS.with_label_values(&[name, status]).inc();

        if let Ok(releases) = &result {
            debug!(provider = %name, results = releases.len(), "Provider search complete");
        }
        result
    }

    fn evaluate(
        &self,
        release: Release,
        criteria: &SearchCriteria,
        context: &SpecialContext,
        series_episodes: &[Episode],
    ) -> Option<Decision> {
        let parsed = match criteria.kind {
            SearchKind::Movie { .. } => parse_movie_title(&release.title),
            _ => parse_title_with_context(&release.title, context),
        };
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(failure) => {
                debug!(
                    provider = %release.provider,
                    guid = %release.guid,
                    reason = failure.reason.as_str(),
                    "Skipping unparseable release"
                );
                PARSE_FAILURES
                    .with_label_values(&["search", failure.reason.as_str()])
                    .inc();
                return None;
            }
        };

        let reference = self.mapper.map_for_search(&parsed, criteria, series_episodes);
        let candidate = RemoteCandidate::new(release, parsed, reference);
        Some(self.pipeline.evaluate(candidate, criteria))
    }
}

/// Fill in provider identity and a guid where the provider left them out.
fn stamp_release(mut release: Release, provider: &dyn ProviderClient) -> Release {
    if release.provider.is_empty() {
        release.provider = provider.name().to_string();
    }
    if release.provider_priority.is_none() {
        release.provider_priority = Some(provider.priority());
    }
    if release.guid.is_empty() {
        release.guid = Release::derive_guid(
            &release.provider,
            release.download_url.as_deref(),
            &release.title,
        );
    }
    release
}

/// Library names a special episode of the search target may be released under.
fn special_context(criteria: &SearchCriteria, series_episodes: &[Episode]) -> SpecialContext {
    let (item_titles, mut performers) = match &criteria.kind {
        SearchKind::SingleItem { item, hints, .. } => {
            let mut titles = non_empty(std::iter::once(item.title.clone()));
            titles.extend(hints.item_title.clone());

            let mut performers = hints.performers.clone();
            performers.extend(item.performers.iter().cloned());
            performers.extend(
                series_episodes
                    .iter()
                    .filter(|e| e.id == item.id)
                    .flat_map(|e| e.performers.iter().cloned()),
            );
            (titles, performers)
        }
        SearchKind::Season { items, .. } => (
            non_empty(items.iter().map(|e| e.title.clone())),
            items.iter().flat_map(|e| e.performers.iter().cloned()).collect(),
        ),
        SearchKind::Movie { .. } => return SpecialContext::default(),
    };
    performers.sort();
    performers.dedup();

    SpecialContext::new(owned(criteria.acceptable_titles()))
        .with_item_titles(item_titles)
        .with_performers(performers)
}

fn owned(titles: Vec<&str>) -> Vec<String> {
    titles.into_iter().map(str::to_string).collect()
}

fn non_empty(titles: impl Iterator<Item = String>) -> Vec<String> {
    titles.filter(|t| !t.trim().is_empty()).collect()
}
