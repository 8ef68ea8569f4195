//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use quarry_core::library::{LastSearchRecorder, LibraryLookup};
use quarry_core::testing::{fixtures, InMemoryLibrary, MockProvider, RecordingSearchRecorder};
use quarry_core::{
    DecisionPipeline, ProviderClient, SearchOrchestrator, SearchSettings,
    StaticQualityDefinitions,
};

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quarry_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Library, recorder and providers wired into a search orchestrator.
pub struct SearchHarness {
    pub library: Arc<InMemoryLibrary>,
    pub recorder: Arc<RecordingSearchRecorder>,
    pub providers: Vec<Arc<MockProvider>>,
    pub orchestrator: SearchOrchestrator,
}

impl SearchHarness {
    /// Series 1 "Show" with S01E01 (10) and S01E02 (11), movie 5 "Heat" (1995).
    pub fn library() -> InMemoryLibrary {
        let library = InMemoryLibrary::new();
        library.add_series(
            fixtures::series(1, "Show"),
            vec![fixtures::episode(10, 1, 1, 1), fixtures::episode(11, 1, 1, 2)],
        );
        library.add_movie(fixtures::movie(5, "Heat", 1995));
        library
    }

    pub fn new(providers: Vec<MockProvider>) -> Self {
        Self::with_settings(
            providers,
            SearchSettings {
                provider_timeout: Duration::from_secs(5),
                max_concurrent_providers: 4,
            },
        )
    }

    pub fn with_settings(providers: Vec<MockProvider>, settings: SearchSettings) -> Self {
        init_tracing();

        let library = Arc::new(Self::library());
        let recorder = Arc::new(RecordingSearchRecorder::new());
        let providers: Vec<Arc<MockProvider>> = providers.into_iter().map(Arc::new).collect();
        let clients: Vec<Arc<dyn ProviderClient>> = providers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn ProviderClient>)
            .collect();

        let pipeline = Arc::new(DecisionPipeline::with_default_specifications(Arc::new(
            StaticQualityDefinitions::with_defaults(),
        )));
        let orchestrator = SearchOrchestrator::new(
            clients,
            pipeline,
            Arc::clone(&library) as Arc<dyn LibraryLookup>,
            Arc::clone(&recorder) as Arc<dyn LastSearchRecorder>,
            settings,
        );

        Self {
            library,
            recorder,
            providers,
            orchestrator,
        }
    }

    pub fn provider(&self, index: usize) -> &MockProvider {
        &self.providers[index]
    }
}
