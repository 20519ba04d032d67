use std::sync::Arc;

use tuneforge_core::{Config, GenerationService, HistoryStore, PlexBackend, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    generation: GenerationService,
    history: Arc<dyn HistoryStore>,
    /// Plex client built from settings, used by the library and machine id
    /// lookups regardless of whether Plex is enabled for generation.
    plex: PlexBackend,
}

impl AppState {
    pub fn new(
        config: Config,
        generation: GenerationService,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let plex = PlexBackend::from_config(&config.plex);
        Self {
            config,
            generation,
            history,
            plex,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn generation(&self) -> &GenerationService {
        &self.generation
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    pub fn plex(&self) -> &PlexBackend {
        &self.plex
    }
}
