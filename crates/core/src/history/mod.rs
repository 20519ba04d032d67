//! Append-only record of generated playlists.

mod sqlite;

pub use sqlite::SqliteHistoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orchestrator::RunState;
use crate::playlist::PlaylistCreationResult;
use crate::track::{BackendKind, ResolvedTrack};

/// Error type for history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for HistoryError {
    fn from(e: rusqlite::Error) -> Self {
        HistoryError::Database(e.to_string())
    }
}

/// One completed generation run. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub num_songs_requested: usize,
    pub num_songs_added_total: usize,
    pub services_targeted: Vec<BackendKind>,
    pub creation_results: PlaylistCreationResult,
    pub tracks: Vec<ResolvedTrack>,
    pub generator_calls: u32,
    pub outcome: RunState,
    pub timestamp: DateTime<Utc>,
}

/// Storage for history entries.
pub trait HistoryStore: Send + Sync {
    /// Persist a new entry.
    fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError>;

    /// All entries, oldest first.
    fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
}
