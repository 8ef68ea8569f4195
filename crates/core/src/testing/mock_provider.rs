//! Mock release provider for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::search::{
    ProviderClient, ProviderError, Release, SearchCriteria, DEFAULT_PROVIDER_PRIORITY,
};

/// Mock implementation of the ProviderClient trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable releases
/// - Record fetched criteria for assertions
/// - Simulate failures and slow responses
///
/// # Example
///
/// ```rust,ignore
/// use quarry_core::testing::{MockProvider, fixtures};
///
/// let provider = MockProvider::new("indexer-a").with_priority(10);
/// provider.set_releases(vec![
///     fixtures::release("g1", "Show.S01E01.720p.HDTV-GRP", 500),
/// ]).await;
///
/// let releases = provider.fetch(&criteria).await?;
/// assert_eq!(provider.fetch_count().await, 1);
/// ```
pub struct MockProvider {
    name: String,
    priority: u32,
    tags: Vec<String>,
    interactive: bool,
    automatic: bool,
    /// Configured releases to return.
    releases: Arc<RwLock<Vec<Release>>>,
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<SearchCriteria>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<ProviderError>>>,
    /// If set, every fetch fails with a connection error carrying this message.
    failure: Arc<RwLock<Option<String>>>,
    /// Simulated response latency.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("tags", &self.tags)
            .field("releases", &"<releases>")
            .finish()
    }
}

impl MockProvider {
    /// Create a provider enabled for both search modes with no releases.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: DEFAULT_PROVIDER_PRIORITY,
            tags: Vec::new(),
            interactive: true,
            automatic: true,
            releases: Arc::new(RwLock::new(Vec::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failure: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_search_modes(mut self, interactive: bool, automatic: bool) -> Self {
        self.interactive = interactive;
        self.automatic = automatic;
        self
    }

    /// Set the releases to return for subsequent fetches.
    pub async fn set_releases(&self, releases: Vec<Release>) {
        *self.releases.write().await = releases;
    }

    /// Add a single release.
    pub async fn add_release(&self, release: Release) {
        self.releases.write().await.push(release);
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every fetch fail until cleared with `None`.
    pub async fn set_failure(&self, message: Option<&str>) {
        *self.failure.write().await = message.map(str::to_string);
    }

    /// Delay every fetch by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Get recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<SearchCriteria> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<Release>, ProviderError> {
        self.fetches.write().await.push(criteria.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(message) = self.failure.read().await.clone() {
            return Err(ProviderError::ConnectionFailed(message));
        }

        Ok(self.releases.read().await.clone())
    }

    fn supports_interactive_search(&self) -> bool {
        self.interactive
    }

    fn supports_automatic_search(&self) -> bool {
        self.automatic
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn priority(&self) -> u32 {
        self.priority
    }
}
