//! Playlist orchestration.
//!
//! The orchestrator alternates between asking the suggestion generator for
//! candidates and resolving them against the library backends until enough
//! tracks are matched or the attempt budget is spent. [`GenerationService`]
//! wraps a run with request validation, publishing and history.

mod config;
mod runner;
mod service;
mod types;

pub use config::OrchestratorConfig;
pub use runner::PlaylistOrchestrator;
pub use service::{
    GenerateRequest, GenerationError, GenerationService, GenerationSummary, DEFAULT_NUM_SONGS,
    DEFAULT_PLAYLIST_NAME,
};
pub use types::{
    next_batch_size, GenerationOutcome, GenerationRequest, RunState, MAX_BATCH, MIN_BATCH,
};
