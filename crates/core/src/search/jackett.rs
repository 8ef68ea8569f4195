//! Jackett provider implementation.
//!
//! Each configured Jackett indexer is exposed as its own [`ProviderClient`],
//! so the orchestrator can apply per-indexer priority, tags and search-mode
//! flags.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{IndexerConfig, JackettConfig};

use super::{
    DownloadProtocol, IndexerFlags, ProviderClient, ProviderError, Release, SearchCriteria,
    SearchKind,
};

const TV_CATEGORY: u32 = 5000;
const MOVIE_CATEGORY: u32 = 2000;

/// A single Jackett indexer.
pub struct JackettProvider {
    client: Client,
    base_url: String,
    api_key: String,
    indexer: IndexerConfig,
}

impl JackettProvider {
    pub fn new(config: &JackettConfig, indexer: IndexerConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ProviderError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            indexer,
        })
    }

    /// One provider per enabled indexer.
    pub fn from_config(
        config: &JackettConfig,
    ) -> Result<Vec<Arc<dyn ProviderClient>>, ProviderError> {
        config
            .indexers
            .iter()
            .filter(|i| i.enabled)
            .map(|i| {
                JackettProvider::new(config, i.clone())
                    .map(|p| Arc::new(p) as Arc<dyn ProviderClient>)
            })
            .collect()
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, criteria: &SearchCriteria) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}",
            self.base_url,
            urlencoding::encode(&self.indexer.name),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&build_query(criteria))
        );
        url.push_str(&format!("&Category[]={}", category_for(criteria)));
        url
    }

    fn to_release(&self, result: JackettResult) -> Release {
        let download_url = result.Link.filter(|l| !l.is_empty()).or(result.MagnetUri);
        let guid = result
            .Guid
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| {
                Release::derive_guid(&self.indexer.name, download_url.as_deref(), &result.Title)
            });

        Release {
            guid,
            title: result.Title,
            size: result.Size.unwrap_or(0).max(0) as u64,
            provider: self.indexer.name.clone(),
            provider_priority: Some(self.indexer.priority),
            protocol: DownloadProtocol::Torrent,
            download_url,
            info_url: result.Details,
            publish_date: result.PublishDate.as_deref().and_then(parse_jackett_date),
            seeders: result.Seeders.map(|s| s.max(0) as u32),
            indexer_flags: IndexerFlags {
                freeleech: result.DownloadVolumeFactor == Some(0.0),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl ProviderClient for JackettProvider {
    fn name(&self) -> &str {
        &self.indexer.name
    }

    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<Release>, ProviderError> {
        let url = self.build_search_url(criteria);
        debug!(indexer = %self.indexer.name, "Searching Jackett");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else if e.is_connect() {
                ProviderError::ConnectionFailed(e.to_string())
            } else {
                ProviderError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        debug!(
            indexer = %self.indexer.name,
            results = jackett_response.Results.len(),
            "Jackett search complete"
        );

        Ok(jackett_response
            .Results
            .into_iter()
            .map(|r| self.to_release(r))
            .collect())
    }

    fn supports_interactive_search(&self) -> bool {
        self.indexer.interactive_search
    }

    fn supports_automatic_search(&self) -> bool {
        self.indexer.automatic_search
    }

    fn tags(&self) -> &[String] {
        &self.indexer.tags
    }

    fn priority(&self) -> u32 {
        self.indexer.priority
    }
}

/// Free-text query for a search target.
fn build_query(criteria: &SearchCriteria) -> String {
    let title = criteria.query_title();
    match &criteria.kind {
        SearchKind::SingleItem { item, hints, .. } => match hints.air_date.or(item.air_date) {
            Some(date) => format!("{} {}", title, date.format("%Y.%m.%d")),
            None => format!(
                "{} S{:02}E{:02}",
                title, item.season_number, item.episode_number
            ),
        },
        SearchKind::Season { season_number, .. } => format!("{} S{:02}", title, season_number),
        SearchKind::Movie { movie } => match movie.year {
            Some(year) => format!("{} {}", title, year),
            None => title.to_string(),
        },
    }
}

fn category_for(criteria: &SearchCriteria) -> u32 {
    match criteria.kind {
        SearchKind::Movie { .. } => MOVIE_CATEGORY,
        SearchKind::SingleItem { .. } | SearchKind::Season { .. } => TV_CATEGORY,
    }
}

/// Parse Jackett's date format.
fn parse_jackett_date(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            // Try parsing without timezone
            chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    Guid: Option<String>,
    Link: Option<String>,
    MagnetUri: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i32>,
    PublishDate: Option<String>,
    Details: Option<String>,
    DownloadVolumeFactor: Option<f64>,
}
