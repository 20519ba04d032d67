//! Parsing of `Title - Artist - Album` lines out of model output.

use tracing::warn;

use crate::track::{TrackSuggestion, UNKNOWN_ALBUM};

const SEPARATOR: &str = " - ";

/// Parse model output into suggestions.
///
/// Lines that do not split into at least a title and an artist are skipped.
pub fn parse_suggestions(text: &str) -> Vec<TrackSuggestion> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                warn!(line = line, "Could not parse suggestion line");
            }
            parsed
        })
        .collect()
}

/// Parse a single line. Returns `None` for unusable lines.
pub fn parse_line(line: &str) -> Option<TrackSuggestion> {
    let parts: Vec<&str> = line.split(SEPARATOR).collect();
    if parts.len() < 2 {
        return None;
    }

    let title = clean_segment(parts[0]);
    let artist = clean_segment(parts[1]);
    let album = parts
        .get(2)
        .map(|a| clean_segment(a))
        .unwrap_or(UNKNOWN_ALBUM);

    if title.is_empty() || artist.is_empty() {
        return None;
    }

    Some(TrackSuggestion::new(title, artist).with_album(album))
}

fn clean_segment(segment: &str) -> &str {
    segment.trim().trim_matches(|c| c == '"' || c == '\'')
}
