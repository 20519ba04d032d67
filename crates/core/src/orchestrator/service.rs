//! End-to-end playlist generation use case.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::history::{HistoryEntry, HistoryStore};
use crate::library::LibraryBackend;
use crate::playlist::{PlaylistCreationResult, PlaylistPublisher};
use crate::suggest::SuggestionGenerator;
use crate::track::BackendKind;

use super::config::OrchestratorConfig;
use super::runner::PlaylistOrchestrator;
use super::types::{GenerationRequest, RunState};

/// Playlist name used when the client does not send one.
pub const DEFAULT_PLAYLIST_NAME: &str = "New TuneForge Playlist";

/// Number of songs requested when the client does not say.
pub const DEFAULT_NUM_SONGS: usize = 10;

/// Conditions that stop a generation before any I/O.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Prompt is required")]
    PromptRequired,

    #[error("num_songs must be at least 1")]
    InvalidSongCount,

    #[error("Ollama URL or Model not configured in settings.")]
    GeneratorNotConfigured,

    #[error("No services (Navidrome/Plex) are enabled or properly configured.")]
    NoBackendsAvailable,
}

/// A client request to generate a playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_playlist_name")]
    pub playlist_name: String,
    #[serde(default = "default_num_songs")]
    pub num_songs: usize,
    /// Backend names to target; empty means every backend.
    #[serde(default)]
    pub services: Vec<String>,
}

fn default_playlist_name() -> String {
    DEFAULT_PLAYLIST_NAME.to_string()
}

fn default_num_songs() -> usize {
    DEFAULT_NUM_SONGS
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            playlist_name: default_playlist_name(),
            num_songs: default_num_songs(),
            services: Vec::new(),
        }
    }

    /// Requested backend kinds, deduplicated in resolution order.
    ///
    /// Unknown names are ignored; no names means all kinds.
    pub fn targeted_kinds(&self) -> Vec<BackendKind> {
        if self.services.is_empty() {
            return BackendKind::ALL.to_vec();
        }
        let mut kinds: Vec<BackendKind> = self
            .services
            .iter()
            .filter_map(|s| {
                let kind = BackendKind::parse(s);
                if kind.is_none() {
                    warn!(service = %s, "Ignoring unknown service");
                }
                kind
            })
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

/// What a generation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub message: String,
    pub playlist_name: String,
    pub tracks_added_count: usize,
    pub target_song_count: usize,
    pub created_in_services: PlaylistCreationResult,
    pub generator_calls: u32,
    pub outcome: RunState,
}

impl GenerationSummary {
    /// True when no track was found and nothing was published.
    pub fn is_empty(&self) -> bool {
        self.tracks_added_count == 0
    }
}

/// Validates requests, runs the orchestrator, publishes and records history.
pub struct GenerationService {
    config: OrchestratorConfig,
    generator: Option<Arc<dyn SuggestionGenerator>>,
    /// Enabled backends; each is still checked for complete settings per run.
    backends: Vec<Arc<dyn LibraryBackend>>,
    history: Arc<dyn HistoryStore>,
}

impl GenerationService {
    pub fn new(
        config: OrchestratorConfig,
        generator: Option<Arc<dyn SuggestionGenerator>>,
        backends: Vec<Arc<dyn LibraryBackend>>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            config,
            generator,
            backends,
            history,
        }
    }

    /// Enabled backends that are targeted by `kinds` and fully configured.
    pub fn select_backends(&self, kinds: &[BackendKind]) -> Vec<Arc<dyn LibraryBackend>> {
        self.backends
            .iter()
            .filter(|b| kinds.contains(&b.kind()))
            .filter(|b| {
                let configured = b.is_configured();
                if !configured {
                    warn!(backend = %b.kind(), "Backend enabled but details missing, disabling for this run");
                }
                configured
            })
            .cloned()
            .collect()
    }

    /// Generate and publish a playlist.
    ///
    /// Finding nothing is not an error: the summary then reports zero tracks
    /// and nothing is published or recorded.
    pub async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationSummary, GenerationError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::PromptRequired);
        }
        if request.num_songs == 0 {
            return Err(GenerationError::InvalidSongCount);
        }
        let generator = self
            .generator
            .clone()
            .ok_or(GenerationError::GeneratorNotConfigured)?;

        let targeted = request.targeted_kinds();
        let backends = self.select_backends(&targeted);
        if backends.is_empty() {
            return Err(GenerationError::NoBackendsAvailable);
        }

        info!(
            prompt = %prompt,
            playlist = %request.playlist_name,
            num_songs = request.num_songs,
            backends = ?backends.iter().map(|b| b.kind()).collect::<Vec<_>>(),
            "Starting playlist generation"
        );

        let orchestrator =
            PlaylistOrchestrator::new(self.config.clone(), generator, backends.clone());
        let outcome = orchestrator
            .run(&GenerationRequest {
                prompt: prompt.to_string(),
                target: request.num_songs,
            })
            .await;

        if outcome.tracks.is_empty() {
            let message = format!(
                "Could not find any tracks for prompt '{}' after {} attempts.",
                prompt, outcome.generator_calls
            );
            error!("{}", message);
            return Ok(GenerationSummary {
                message,
                playlist_name: request.playlist_name,
                tracks_added_count: 0,
                target_song_count: request.num_songs,
                created_in_services: PlaylistCreationResult::new(),
                generator_calls: outcome.generator_calls,
                outcome: outcome.final_state,
            });
        }

        let publisher = PlaylistPublisher::new(backends);
        let created = publisher
            .publish(&request.playlist_name, &outcome.tracks)
            .await;

        let entry = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.playlist_name.clone(),
            prompt: prompt.to_string(),
            num_songs_requested: request.num_songs,
            num_songs_added_total: outcome.found,
            services_targeted: targeted,
            creation_results: created.clone(),
            tracks: outcome.tracks,
            generator_calls: outcome.generator_calls,
            outcome: outcome.final_state,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.history.append(&entry) {
            error!(error = %e, playlist = %request.playlist_name, "Failed to record playlist history");
        }

        Ok(GenerationSummary {
            message: format!(
                "Playlist '{}' generation complete. Found {}/{} tracks.",
                request.playlist_name, outcome.found, request.num_songs
            ),
            playlist_name: request.playlist_name,
            tracks_added_count: outcome.found,
            target_song_count: request.num_songs,
            created_in_services: created,
            generator_calls: outcome.generator_calls,
            outcome: outcome.final_state,
        })
    }
}
