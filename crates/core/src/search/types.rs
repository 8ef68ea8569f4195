//! Types for the release search system.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::decision::Decision;
use crate::library::{Episode, LibraryError, LibraryItemKey, Movie, Series};

/// Priority assumed for a release whose provider priority is unknown.
/// Lower values win.
pub const DEFAULT_PROVIDER_PRIORITY: u32 = 25;

/// Transport a release is fetched over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadProtocol {
    #[default]
    Torrent,
    Usenet,
}

/// Provider-reported flags on a release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerFlags {
    #[serde(default)]
    pub freeleech: bool,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub scene: bool,
}

/// A raw result returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Dedup key.
    pub guid: String,
    pub title: String,
    /// Size in bytes; 0 when the provider does not advertise one.
    pub size: u64,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_priority: Option<u32>,
    #[serde(default)]
    pub protocol: DownloadProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<u32>,
    #[serde(default)]
    pub indexer_flags: IndexerFlags,
}

impl Release {
    pub fn new(guid: impl Into<String>, title: impl Into<String>, size: u64) -> Self {
        Self {
            guid: guid.into(),
            title: title.into(),
            size,
            provider: String::new(),
            provider_priority: None,
            protocol: DownloadProtocol::default(),
            download_url: None,
            info_url: None,
            publish_date: None,
            seeders: None,
            indexer_flags: IndexerFlags::default(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>, priority: Option<u32>) -> Self {
        self.provider = provider.into();
        self.provider_priority = priority;
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn with_seeders(mut self, seeders: u32) -> Self {
        self.seeders = Some(seeders);
        self
    }

    pub fn with_publish_date(mut self, date: DateTime<Utc>) -> Self {
        self.publish_date = Some(date);
        self
    }

    /// Provider priority with the documented fallback applied.
    pub fn effective_priority(&self) -> u32 {
        self.provider_priority.unwrap_or(DEFAULT_PROVIDER_PRIORITY)
    }

    /// Stable guid for providers that do not supply one.
    pub fn derive_guid(provider: &str, download_url: Option<&str>, title: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(provider.as_bytes());
        hasher.update([0u8]);
        hasher.update(download_url.unwrap_or_default().as_bytes());
        hasher.update([0u8]);
        hasher.update(title.as_bytes());
        let digest = hasher.finalize();
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}-{}", provider, &hex[..32])
    }
}

/// Hints for a single-item search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,
}

/// What a search is looking for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchKind {
    SingleItem {
        series: Series,
        item: Episode,
        #[serde(default)]
        hints: SearchHints,
    },
    Season {
        series: Series,
        items: Vec<Episode>,
        season_number: u32,
    },
    Movie {
        movie: Movie,
    },
}

/// A logical search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub kind: SearchKind,
    /// Started by a user rather than by a schedule.
    #[serde(default)]
    pub user_invoked: bool,
    /// Interactive searches only use providers enabled for interactive search.
    #[serde(default)]
    pub interactive: bool,
    /// Extra titles a release may be published under.
    #[serde(default)]
    pub alias_titles: Vec<String>,
}

impl SearchCriteria {
    fn from_kind(kind: SearchKind) -> Self {
        Self {
            kind,
            user_invoked: false,
            interactive: false,
            alias_titles: Vec::new(),
        }
    }

    pub fn single_item(series: Series, item: Episode, hints: SearchHints) -> Self {
        Self::from_kind(SearchKind::SingleItem {
            series,
            item,
            hints,
        })
    }

    pub fn season(
        series: Series,
        items: Vec<Episode>,
        season_number: u32,
    ) -> Result<Self, SearchError> {
        let criteria = Self::from_kind(SearchKind::Season {
            series,
            items,
            season_number,
        });
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn movie(movie: Movie) -> Self {
        Self::from_kind(SearchKind::Movie { movie })
    }

    pub fn user_invoked(mut self, user_invoked: bool) -> Self {
        self.user_invoked = user_invoked;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_alias_titles(mut self, titles: Vec<String>) -> Self {
        self.alias_titles = titles;
        self
    }

    /// Reject structurally invalid criteria.
    pub fn validate(&self) -> Result<(), SearchError> {
        match &self.kind {
            SearchKind::SingleItem { series, item, .. } => {
                if item.series_id != series.id {
                    return Err(SearchError::InvalidCriteria(format!(
                        "episode {} does not belong to series {}",
                        item.id, series.id
                    )));
                }
            }
            SearchKind::Season { series, items, .. } => {
                if items.is_empty() {
                    return Err(SearchError::InvalidCriteria(
                        "season search requires at least one episode".to_string(),
                    ));
                }
                if let Some(stray) = items.iter().find(|e| e.series_id != series.id) {
                    return Err(SearchError::InvalidCriteria(format!(
                        "episode {} does not belong to series {}",
                        stray.id, series.id
                    )));
                }
            }
            SearchKind::Movie { .. } => {}
        }
        Ok(())
    }

    /// Short label for logs and metrics.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SearchKind::SingleItem { .. } => "single_item",
            SearchKind::Season { .. } => "season",
            SearchKind::Movie { .. } => "movie",
        }
    }

    pub fn series(&self) -> Option<&Series> {
        match &self.kind {
            SearchKind::SingleItem { series, .. } | SearchKind::Season { series, .. } => {
                Some(series)
            }
            SearchKind::Movie { .. } => None,
        }
    }

    /// Episodes the search is for; empty for movie searches.
    pub fn episodes(&self) -> Vec<&Episode> {
        match &self.kind {
            SearchKind::SingleItem { item, .. } => vec![item],
            SearchKind::Season { items, .. } => items.iter().collect(),
            SearchKind::Movie { .. } => Vec::new(),
        }
    }

    pub fn target_items(&self) -> Vec<LibraryItemKey> {
        match &self.kind {
            SearchKind::SingleItem { item, .. } => vec![item.key()],
            SearchKind::Season { items, .. } => items.iter().map(Episode::key).collect(),
            SearchKind::Movie { movie } => vec![movie.key()],
        }
    }

    pub fn target_tags(&self) -> &[String] {
        match &self.kind {
            SearchKind::SingleItem { series, .. } | SearchKind::Season { series, .. } => {
                &series.tags
            }
            SearchKind::Movie { movie } => &movie.tags,
        }
    }

    /// Primary, alternate and alias titles a release may be named after.
    pub fn acceptable_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = match &self.kind {
            SearchKind::SingleItem { series, .. } | SearchKind::Season { series, .. } => {
                series.all_titles().map(String::as_str).collect()
            }
            SearchKind::Movie { movie } => vec![movie.title.as_str()],
        };
        titles.extend(self.alias_titles.iter().map(String::as_str));
        titles
    }

    /// Title used for the provider query.
    pub fn query_title(&self) -> &str {
        match &self.kind {
            SearchKind::SingleItem { series, .. } | SearchKind::Season { series, .. } => {
                &series.title
            }
            SearchKind::Movie { movie } => &movie.title,
        }
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Deduplicated decisions, best first.
    pub decisions: Vec<Decision>,
    /// Providers that were dispatched to.
    pub providers_queried: Vec<String>,
    /// Providers that failed (name -> error message). Failures of providers
    /// sharing a name are joined under one key.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub provider_errors: HashMap<String, String>,
    /// Number of dispatched providers that failed, counted per provider.
    #[serde(default)]
    pub providers_failed: usize,
    pub duration_ms: u64,
}

impl SearchResult {
    pub fn accepted(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(|d| d.is_accepted())
    }

    /// True when providers were queried and every one of them failed.
    pub fn all_providers_failed(&self) -> bool {
        !self.providers_queried.is_empty() && self.providers_failed == self.providers_queried.len()
    }
}

/// Errors from a single provider fetch.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Provider API error: {0}")]
    ApiError(String),

    #[error("Provider returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors that abort a whole search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// A source of releases (an indexer or an aggregator endpoint).
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider name for logging and dedup tie-breaks.
    fn name(&self) -> &str;

    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<Release>, ProviderError>;

    fn supports_interactive_search(&self) -> bool {
        true
    }

    fn supports_automatic_search(&self) -> bool {
        true
    }

    /// Tags restricting which library items the provider serves. Empty = all.
    fn tags(&self) -> &[String] {
        &[]
    }

    /// Lower values are preferred.
    fn priority(&self) -> u32 {
        DEFAULT_PROVIDER_PRIORITY
    }
}
