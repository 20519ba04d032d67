//! Core library for TuneForge: turns a free text mood into a playlist built
//! from tracks that really exist in the user's music libraries.

pub mod accumulator;
pub mod config;
pub mod filter;
pub mod history;
pub mod library;
pub mod metrics;
pub mod orchestrator;
pub mod playlist;
pub mod suggest;
pub mod testing;
pub mod track;

pub use accumulator::MatchAccumulator;
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    LoggingConfig, NavidromeConfig, PlexConfig, SanitizedConfig, ServerConfig,
};
pub use filter::{filter_candidates, CandidateFilter};
pub use history::{HistoryEntry, HistoryError, HistoryStore, SqliteHistoryStore};
pub use library::{
    resolve_batch, ConnectionReport, LibraryBackend, LibraryError, LibrarySection, PlaylistOutcome,
    PlexBackend, SubsonicBackend,
};
pub use orchestrator::{
    next_batch_size, GenerateRequest, GenerationError, GenerationOutcome, GenerationRequest,
    GenerationService, GenerationSummary, OrchestratorConfig, PlaylistOrchestrator, RunState,
};
pub use playlist::{PlaylistCreation, PlaylistCreationResult, PlaylistPublisher, PublishStatus};
pub use suggest::{
    GeneratorConfig, LlmClient, LlmError, LlmSuggestionGenerator, OllamaClient, PreferencesConfig,
    SuggestionGenerator, SuggestionRequest,
};
pub use track::{BackendKind, MatchKey, ResolvedTrack, TrackSuggestion, UNKNOWN_ALBUM};
