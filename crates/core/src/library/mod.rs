//! Music library backends.
//!
//! A [`LibraryBackend`] confirms suggestions against a real library and
//! publishes playlists there. Two backends exist:
//! - [`SubsonicBackend`] for Navidrome and other Subsonic API servers
//! - [`PlexBackend`] for a single Plex music library section

mod plex;
mod subsonic;
mod types;

pub use plex::{select_plex_match, PlexBackend};
pub use subsonic::{normalize_base_url, select_subsonic_match, SubsonicBackend};
pub use types::*;
pub(crate) use types::string_or_number;

use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::accumulator::MatchAccumulator;
use crate::metrics;
use crate::track::{BackendKind, ResolvedTrack, TrackSuggestion};

/// Errors that can occur when talking to a library backend.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Connection could not be established or was dropped.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not finish in time.
    #[error("Request timed out")]
    Timeout,

    /// Server answered with a non-success HTTP status.
    #[error("HTTP error: {status} - {message}")]
    Protocol { status: u16, message: String },

    /// Server answered but reported a failure in its payload.
    #[error("API Error: {message} (code {code})")]
    Api { code: i64, message: String },

    /// Response body was not what we expected.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A playlist needs at least one track.
    #[error("No track IDs provided")]
    EmptyPlaylist,

    /// Required settings are missing.
    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for LibraryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LibraryError::Timeout
        } else if e.is_decode() {
            LibraryError::Parse(e.to_string())
        } else {
            LibraryError::Transport(e.to_string())
        }
    }
}

/// A music library that can confirm tracks and hold playlists.
#[async_trait]
pub trait LibraryBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// True when every setting needed for resolving and publishing is present.
    fn is_configured(&self) -> bool;

    /// Look `candidate` up in the library.
    ///
    /// Misconfiguration, HTTP failures, timeouts and malformed bodies all
    /// yield `None`.
    async fn resolve(&self, candidate: &TrackSuggestion) -> Option<ResolvedTrack>;

    /// Create (or replace) the playlist `name` holding `ids`.
    async fn create_playlist(
        &self,
        name: &str,
        ids: &[String],
    ) -> Result<PlaylistOutcome, LibraryError>;

    /// Check reachability and credentials.
    async fn test_connection(&self) -> ConnectionReport;
}

/// Resolve `candidates` against `backend`, recording matches in `accumulator`.
///
/// Candidates that are incomplete or whose key is already present are
/// skipped without a lookup. Matches are stored under the suggestion's key.
/// Returns the tracks added by this call.
pub async fn resolve_batch(
    backend: &dyn LibraryBackend,
    candidates: &[TrackSuggestion],
    accumulator: &mut MatchAccumulator,
) -> Vec<ResolvedTrack> {
    let kind = backend.kind();
    if !backend.is_configured() {
        warn!(backend = %kind, "Backend settings missing, skipping search batch");
        return Vec::new();
    }

    let mut added = Vec::new();
    for candidate in candidates {
        if !candidate.is_complete() || accumulator.contains(&candidate.key()) {
            continue;
        }

        let Some(track) = backend.resolve(candidate).await else {
            debug!(
                backend = %kind,
                title = %candidate.title,
                artist = %candidate.artist,
                "No match"
            );
            continue;
        };

        info!(
            backend = %kind,
            matched_title = %track.title,
            matched_artist = %track.artist,
            title = %candidate.title,
            artist = %candidate.artist,
            "Matched suggestion"
        );

        if accumulator.insert_if_absent(track.clone()) {
            metrics::TRACKS_RESOLVED
                .with_label_values(&[kind.as_str()])
                .inc();
            added.push(track);
        }
    }

    added
}

/// Record the duration of a backend call.
pub(crate) fn observe(kind: BackendKind, operation: &str, started: Instant) {
    metrics::LIBRARY_REQUEST_DURATION
        .with_label_values(&[kind.as_str(), operation])
        .observe(started.elapsed().as_secs_f64());
}

/// Build a [`ResolvedTrack`] from the selected hit.
pub(crate) fn resolved_from_hit(
    hit: &SearchHit,
    kind: BackendKind,
    candidate: &TrackSuggestion,
) -> ResolvedTrack {
    ResolvedTrack {
        backend_id: hit.id.clone(),
        title: hit.title.clone(),
        artist: hit.artist.clone(),
        album: hit.album.clone(),
        backend: kind,
        original_suggestion: candidate.clone(),
    }
}
