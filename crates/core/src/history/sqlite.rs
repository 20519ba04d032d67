//! SQLite-backed history store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::SecondsFormat;
use rusqlite::{params, Connection};

use super::{HistoryEntry, HistoryError, HistoryStore};

/// SQLite-backed history store.
///
/// Entries are stored as JSON documents next to a few indexed columns.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Open (or create) the database at `path`.
    pub fn new(path: &Path) -> Result<Self, HistoryError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), HistoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS playlist_history (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                name TEXT NOT NULL,
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_playlist_history_created_at
                ON playlist_history(created_at);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn
            .lock()
            .map_err(|_| HistoryError::Database("connection lock poisoned".to_string()))
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let data = serde_json::to_string(entry)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO playlist_history (id, created_at, name, data) VALUES (?, ?, ?, ?)",
            params![
                entry.id,
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                entry.name,
                data
            ],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT data FROM playlist_history ORDER BY created_at ASC, rowid ASC")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(serde_json::from_str(&row?)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::RunState;
    use crate::playlist::{PlaylistCreation, PlaylistCreationResult, PublishStatus};
    use crate::track::{BackendKind, ResolvedTrack, TrackSuggestion};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn entry(name: &str, offset_secs: i64) -> HistoryEntry {
        let mut creation_results = PlaylistCreationResult::new();
        creation_results.insert(
            BackendKind::Navidrome,
            PlaylistCreation {
                id: Some("pl-1".to_string()),
                track_count: 1,
                status: PublishStatus::Success,
            },
        );

        HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            prompt: "late night jazz".to_string(),
            num_songs_requested: 10,
            num_songs_added_total: 1,
            services_targeted: vec![BackendKind::Navidrome],
            creation_results,
            tracks: vec![ResolvedTrack {
                backend_id: "s1".to_string(),
                title: "So What".to_string(),
                artist: "Miles Davis".to_string(),
                album: "Kind of Blue".to_string(),
                backend: BackendKind::Navidrome,
                original_suggestion: TrackSuggestion::new("So What", "Miles Davis"),
            }],
            generator_calls: 3,
            outcome: RunState::Exhausted,
            timestamp: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_append_and_list_in_memory() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        assert!(store.list().unwrap().is_empty());

        let first = entry("First", 0);
        store.append(&first).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![first]);
    }

    #[test]
    fn test_list_is_oldest_first() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        store.append(&entry("Newer", 60)).unwrap();
        store.append(&entry("Older", 0)).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Older", "Newer"]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        let e = entry("Once", 0);
        store.append(&e).unwrap();
        assert!(matches!(store.append(&e), Err(HistoryError::Database(_))));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.db");

        {
            let store = SqliteHistoryStore::new(&path).unwrap();
            store.append(&entry("Kept", 0)).unwrap();
        }

        let store = SqliteHistoryStore::new(&path).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Kept");
        assert_eq!(listed[0].outcome, RunState::Exhausted);
    }
}
