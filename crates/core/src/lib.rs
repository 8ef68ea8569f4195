pub mod candidate;
pub mod config;
pub mod decision;
pub mod history;
pub mod library;
pub mod metrics;
pub mod parser;
pub mod quality;
pub mod search;
pub mod testing;
pub mod tracking;

pub use candidate::{CandidateMapper, LibraryMatch, LibraryMatchRef, LibraryReference, RemoteCandidate};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use decision::{Decision, DecisionPipeline, DecisionSpecification, Rejection, RejectionKind};
pub use parser::{parse_title, ParseFailure, ParsedReleaseInfo, ReleaseNumbering};
pub use quality::{Quality, QualityDefinition, QualityDefinitionLookup, StaticQualityDefinitions};
pub use search::{
    JackettProvider, ProviderClient, ProviderError, Release, SearchCriteria, SearchError,
    SearchOrchestrator, SearchResult, SearchSettings,
};
pub use tracking::{
    LibraryChangeEvent, SqliteTrackedDownloadStore, TrackedDownload, TrackedDownloadService,
    TrackingError,
};
