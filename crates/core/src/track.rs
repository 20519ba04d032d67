//! Track types shared by every stage of playlist generation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Album placeholder used when the model does not name one.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// A song proposed by the text generation model, not yet confirmed in any library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSuggestion {
    pub title: String,
    pub artist: String,
    #[serde(default = "unknown_album")]
    pub album: String,
}

fn unknown_album() -> String {
    UNKNOWN_ALBUM.to_string()
}

impl TrackSuggestion {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: unknown_album(),
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Deduplication key for this suggestion.
    pub fn key(&self) -> MatchKey {
        MatchKey::new(&self.title, &self.artist)
    }

    /// True when both title and artist carry text.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.artist.trim().is_empty()
    }

    /// True when the album is the placeholder.
    pub fn has_unknown_album(&self) -> bool {
        self.album.trim().is_empty() || self.album.eq_ignore_ascii_case(UNKNOWN_ALBUM)
    }
}

/// Music library backends a track can be resolved against.
///
/// The declaration order is the resolution order used by the orchestrator:
/// the section scoped Plex backend always runs last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Navidrome,
    Plex,
}

impl BackendKind {
    /// All kinds in resolution order.
    pub const ALL: [BackendKind; 2] = [BackendKind::Navidrome, BackendKind::Plex];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Navidrome => "navidrome",
            BackendKind::Plex => "plex",
        }
    }

    /// Parse a service name as sent by API clients (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "navidrome" => Some(BackendKind::Navidrome),
            "plex" => Some(BackendKind::Plex),
            _ => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suggestion confirmed to exist in a backend library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    /// Backend native identifier (Subsonic song id, Plex rating key).
    pub backend_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub backend: BackendKind,
    pub original_suggestion: TrackSuggestion,
}

/// Case-insensitive (title, artist) identity of a track. Album is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchKey {
    title: String,
    artist: String,
}

impl MatchKey {
    pub fn new(title: &str, artist: &str) -> Self {
        Self {
            title: title.to_lowercase(),
            artist: artist.to_lowercase(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_key_ignores_case_and_album() {
        let a = TrackSuggestion::new("Bohemian Rhapsody", "Queen").with_album("A Night at the Opera");
        let b = TrackSuggestion::new("BOHEMIAN RHAPSODY", "queen").with_album("Greatest Hits");
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().title(), "bohemian rhapsody");
    }

    #[test]
    fn test_suggestion_defaults_album() {
        let suggestion: TrackSuggestion =
            serde_json::from_str(r#"{"title":"Song","artist":"Band"}"#).unwrap();
        assert_eq!(suggestion.album, UNKNOWN_ALBUM);
        assert!(suggestion.has_unknown_album());
    }

    #[test]
    fn test_backend_kind_parse_and_order() {
        assert_eq!(BackendKind::parse("Navidrome"), Some(BackendKind::Navidrome));
        assert_eq!(BackendKind::parse(" PLEX "), Some(BackendKind::Plex));
        assert_eq!(BackendKind::parse("spotify"), None);
        assert!(BackendKind::Navidrome < BackendKind::Plex);
        assert_eq!(serde_json::to_string(&BackendKind::Plex).unwrap(), "\"plex\"");
    }

    #[test]
    fn test_incomplete_suggestion() {
        assert!(!TrackSuggestion::new("  ", "Queen").is_complete());
        assert!(TrackSuggestion::new("Song", "Queen").is_complete());
    }
}
