//! Publishing matched tracks as playlists on each backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::accumulator::ids_for;
use crate::library::LibraryBackend;
use crate::metrics;
use crate::track::{BackendKind, ResolvedTrack};

/// Outcome of publishing to one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Success,
    Failed,
    /// Nothing was matched on this backend, so no call was made.
    NoTracks,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Success => "success",
            PublishStatus::Failed => "failed",
            PublishStatus::NoTracks => "no_tracks",
        }
    }
}

/// Per backend publishing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCreation {
    pub id: Option<String>,
    pub track_count: usize,
    pub status: PublishStatus,
}

impl PlaylistCreation {
    fn without_playlist(status: PublishStatus) -> Self {
        Self {
            id: None,
            track_count: 0,
            status,
        }
    }
}

/// Publishing records keyed by backend.
pub type PlaylistCreationResult = BTreeMap<BackendKind, PlaylistCreation>;

/// Creates one playlist per backend from a run's matches.
pub struct PlaylistPublisher {
    backends: Vec<Arc<dyn LibraryBackend>>,
}

impl PlaylistPublisher {
    pub fn new(backends: Vec<Arc<dyn LibraryBackend>>) -> Self {
        Self { backends }
    }

    /// Publish `tracks` as playlist `name` on every backend.
    ///
    /// Each backend only receives the ids it resolved itself. A failure on
    /// one backend is recorded and the others are still processed.
    pub async fn publish(&self, name: &str, tracks: &[ResolvedTrack]) -> PlaylistCreationResult {
        let mut results = PlaylistCreationResult::new();

        for backend in &self.backends {
            let kind = backend.kind();
            let ids = ids_for(tracks, kind);

            let creation = if ids.is_empty() {
                info!(backend = %kind, playlist = %name, "No tracks matched, skipping playlist");
                PlaylistCreation::without_playlist(PublishStatus::NoTracks)
            } else {
                match backend.create_playlist(name, &ids).await {
                    Ok(outcome) => PlaylistCreation {
                        id: Some(outcome.id),
                        track_count: outcome.track_count,
                        status: PublishStatus::Success,
                    },
                    Err(e) => {
                        error!(backend = %kind, playlist = %name, error = %e, "Failed to publish playlist");
                        PlaylistCreation::without_playlist(PublishStatus::Failed)
                    }
                }
            };

            metrics::PLAYLISTS_PUBLISHED
                .with_label_values(&[kind.as_str(), creation.status.as_str()])
                .inc();
            results.insert(kind, creation);
        }

        results
    }
}
