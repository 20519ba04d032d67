//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the generator and library
//! backend traits, allowing full generation runs without a model server or
//! music library.
//!
//! # Example
//!
//! ```rust,ignore
//! use tuneforge_core::testing::{fixtures, MockLibraryBackend, MockSuggestionGenerator};
//!
//! let generator = MockSuggestionGenerator::with_batches(vec![
//!     vec![fixtures::suggestion("Africa", "Toto")],
//! ]);
//! let navidrome = MockLibraryBackend::with_tracks(BackendKind::Navidrome, &[("Africa", "Toto")]);
//!
//! // Use in PlaylistOrchestrator or GenerationService...
//! ```

mod mock_generator;
mod mock_library;

pub use mock_generator::{MockSuggestionGenerator, RecordedGeneration};
pub use mock_library::{MockLibraryBackend, RecordedPlaylist};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::track::{BackendKind, ResolvedTrack, TrackSuggestion};

    /// A suggestion with the placeholder album.
    pub fn suggestion(title: &str, artist: &str) -> TrackSuggestion {
        TrackSuggestion::new(title, artist)
    }

    /// `count` distinct suggestions titled `"{prefix} {i}"` by `"Artist {i}"`.
    pub fn numbered_suggestions(prefix: &str, count: usize) -> Vec<TrackSuggestion> {
        (1..=count)
            .map(|i| TrackSuggestion::new(format!("{} {}", prefix, i), format!("Artist {}", i)))
            .collect()
    }

    /// Catalog pairs matching [`numbered_suggestions`].
    pub fn numbered_catalog(prefix: &str, count: usize) -> Vec<(String, String)> {
        (1..=count)
            .map(|i| (format!("{} {}", prefix, i), format!("Artist {}", i)))
            .collect()
    }

    /// A resolved track whose suggestion matches its metadata.
    pub fn resolved(id: &str, title: &str, artist: &str, backend: BackendKind) -> ResolvedTrack {
        ResolvedTrack {
            backend_id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: "Test Album".to_string(),
            backend,
            original_suggestion: TrackSuggestion::new(title, artist),
        }
    }
}
