//! Mock library backend for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::library::{ConnectionReport, LibraryBackend, LibraryError, PlaylistOutcome};
use crate::track::{BackendKind, MatchKey, ResolvedTrack, TrackSuggestion};

/// A recorded playlist creation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPlaylist {
    pub name: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    id: String,
    title: String,
    artist: String,
}

/// Mock implementation of the LibraryBackend trait.
///
/// Provides controllable behavior for testing:
/// - A catalog of known tracks matched by case-insensitive title and artist
/// - Recorded lookups and playlist creations for assertions
/// - Simulated missing configuration and playlist failures
///
/// # Example
///
/// ```rust,ignore
/// use tuneforge_core::testing::MockLibraryBackend;
///
/// let backend = MockLibraryBackend::with_tracks(
///     BackendKind::Navidrome,
///     &[("Africa", "Toto"), ("Rosanna", "Toto")],
/// );
/// let track = backend.resolve(&TrackSuggestion::new("africa", "toto")).await;
/// assert!(track.is_some());
/// assert_eq!(backend.lookup_count().await, 1);
/// ```
pub struct MockLibraryBackend {
    kind: BackendKind,
    configured: AtomicBool,
    next_id: AtomicUsize,
    catalog: Arc<RwLock<HashMap<MatchKey, CatalogEntry>>>,
    lookups: Arc<RwLock<Vec<TrackSuggestion>>>,
    playlists: Arc<RwLock<Vec<RecordedPlaylist>>>,
    fail_create: Arc<RwLock<bool>>,
    connection: Arc<RwLock<ConnectionReport>>,
}

impl std::fmt::Debug for MockLibraryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLibraryBackend")
            .field("kind", &self.kind)
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

impl MockLibraryBackend {
    /// Create a configured backend with an empty catalog.
    pub fn new(kind: BackendKind) -> Self {
        Self::with_tracks::<&str, &str>(kind, &[])
    }

    /// Create a configured backend knowing the given (title, artist) pairs.
    pub fn with_tracks<T, U>(kind: BackendKind, tracks: &[(T, U)]) -> Self
    where
        T: AsRef<str>,
        U: AsRef<str>,
    {
        let catalog = tracks
            .iter()
            .enumerate()
            .map(|(i, (title, artist))| {
                let (title, artist) = (title.as_ref(), artist.as_ref());
                (
                    MatchKey::new(title, artist),
                    CatalogEntry {
                        id: format!("{}-{}", kind, i + 1),
                        title: title.to_string(),
                        artist: artist.to_string(),
                    },
                )
            })
            .collect();

        Self {
            kind,
            configured: AtomicBool::new(true),
            next_id: AtomicUsize::new(tracks.len() + 1),
            catalog: Arc::new(RwLock::new(catalog)),
            lookups: Arc::new(RwLock::new(Vec::new())),
            playlists: Arc::new(RwLock::new(Vec::new())),
            fail_create: Arc::new(RwLock::new(false)),
            connection: Arc::new(RwLock::new(ConnectionReport {
                success: true,
                message: Some(format!("Connected to mock {kind}")),
                ..Default::default()
            })),
        }
    }

    /// Add a track to the catalog, returning its id.
    pub async fn add_track(&self, title: &str, artist: &str) -> String {
        let id = format!("{}-{}", self.kind, self.next_id.fetch_add(1, Ordering::SeqCst));
        self.catalog.write().await.insert(
            MatchKey::new(title, artist),
            CatalogEntry {
                id: id.clone(),
                title: title.to_string(),
                artist: artist.to_string(),
            },
        );
        id
    }

    /// Simulate missing settings.
    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }

    /// Make playlist creation fail.
    pub async fn set_fail_create(&self, fail: bool) {
        *self.fail_create.write().await = fail;
    }

    /// Set the report returned by `test_connection`.
    pub async fn set_connection_report(&self, report: ConnectionReport) {
        *self.connection.write().await = report;
    }

    /// Suggestions looked up so far, in call order.
    pub async fn recorded_lookups(&self) -> Vec<TrackSuggestion> {
        self.lookups.read().await.clone()
    }

    pub async fn lookup_count(&self) -> usize {
        self.lookups.read().await.len()
    }

    /// Playlists created so far.
    pub async fn recorded_playlists(&self) -> Vec<RecordedPlaylist> {
        self.playlists.read().await.clone()
    }
}

#[async_trait]
impl LibraryBackend for MockLibraryBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    async fn resolve(&self, candidate: &TrackSuggestion) -> Option<ResolvedTrack> {
        if !self.is_configured() {
            return None;
        }
        self.lookups.write().await.push(candidate.clone());

        let catalog = self.catalog.read().await;
        let entry = catalog.get(&candidate.key())?;
        Some(ResolvedTrack {
            backend_id: entry.id.clone(),
            title: entry.title.clone(),
            artist: entry.artist.clone(),
            album: candidate.album.clone(),
            backend: self.kind,
            original_suggestion: candidate.clone(),
        })
    }

    async fn create_playlist(
        &self,
        name: &str,
        ids: &[String],
    ) -> Result<PlaylistOutcome, LibraryError> {
        self.playlists.write().await.push(RecordedPlaylist {
            name: name.to_string(),
            ids: ids.to_vec(),
        });

        if *self.fail_create.read().await {
            return Err(LibraryError::Protocol {
                status: 500,
                message: "mock playlist failure".to_string(),
            });
        }

        Ok(PlaylistOutcome {
            id: format!("{}-playlist-{}", self.kind, name.len()),
            track_count: ids.len(),
        })
    }

    async fn test_connection(&self) -> ConnectionReport {
        self.connection.read().await.clone()
    }
}
