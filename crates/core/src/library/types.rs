//! Types shared by the library backends.

use serde::{Deserialize, Deserializer, Serialize};

/// A track returned by a backend search, before selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Library section the backend reported the track in, if any.
    pub section_id: Option<String>,
}

impl SearchHit {
    /// Case-insensitive title and artist equality.
    pub fn matches(&self, title: &str, artist: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
            && self.artist.to_lowercase() == artist.to_lowercase()
    }
}

/// Result of a successful playlist creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistOutcome {
    /// Backend playlist identifier.
    pub id: String,
    /// Number of tracks the playlist holds, as best known.
    pub track_count: usize,
}

/// Outcome of a connection test, returned to API clients as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Raw diagnostic values (URLs tried, status codes, response snippets).
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<serde_json::Value>,
}

impl ConnectionReport {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.details.insert(key.to_string(), value.into());
    }
}

/// A music library section on a Plex server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySection {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Response snippets are capped at this many characters.
pub(crate) const SNIPPET_LEN: usize = 500;

pub(crate) fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}

/// Deserialize a string, number or boolean into an optional string.
///
/// Config values read from the environment arrive typed, so a numeric
/// section id or password must still land in a `String` field.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => Some(s),
        Some(Raw::Int(i)) => Some(i.to_string()),
        Some(Raw::Float(f)) => Some(f.to_string()),
        Some(Raw::Bool(b)) => Some(b.to_string()),
        None => None,
    })
}

/// Deserialize a JSON number or numeric string into an optional count.
pub(crate) fn count_from_any<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_number(deserializer)?.and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string_or_number")]
        value: Option<String>,
        #[serde(default, deserialize_with = "count_from_any")]
        count: Option<usize>,
    }

    #[test]
    fn test_string_or_number() {
        let p: Probe = serde_json::from_str(r#"{"value": 3, "count": "12"}"#).unwrap();
        assert_eq!(p.value.as_deref(), Some("3"));
        assert_eq!(p.count, Some(12));

        let p: Probe = serde_json::from_str(r#"{"value": "abc"}"#).unwrap();
        assert_eq!(p.value.as_deref(), Some("abc"));
        assert_eq!(p.count, None);

        let p: Probe = serde_json::from_str(r#"{"value": true}"#).unwrap();
        assert_eq!(p.value.as_deref(), Some("true"));
    }

    #[test]
    fn test_hit_matches_case_insensitively() {
        let hit = SearchHit {
            id: "1".to_string(),
            title: "Bohemian Rhapsody".to_string(),
            artist: "Queen".to_string(),
            album: "A Night at the Opera".to_string(),
            section_id: None,
        };
        assert!(hit.matches("bohemian rhapsody", "QUEEN"));
        assert!(!hit.matches("Bohemian Rhapsody", "Queen + Adam Lambert"));
    }

    #[test]
    fn test_snippet_caps_length() {
        let long = "x".repeat(600);
        assert_eq!(snippet(&long).len(), SNIPPET_LEN);
        assert_eq!(snippet("short"), "short");
    }
}
