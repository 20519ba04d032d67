//! Candidate filtering ahead of library resolution.
//!
//! Removes suggestions that are incomplete, already matched, or that name an
//! undesirable variant (live takes, karaoke, covers, remixes and similar).

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::accumulator::MatchAccumulator;
use crate::track::TrackSuggestion;

/// Variant markers searched for in lowercased titles and album names.
pub const UNDESIRABLE_PATTERNS: &[&str] = &[
    r"\(live\b",
    r"\[live\b",
    r"- live\b",
    r"\blive at\b",
    r"\blive from\b",
    r"\(instrumental\b",
    r"\[instrumental\b",
    r"- instrumental\b",
    r"\(karaoke\b",
    r"\[karaoke\b",
    r"- karaoke\b",
    r"karaoke version\b",
    r"\(cover\b",
    r"\[cover\b",
    r"- cover\b",
    r" tribute\b",
    r"\(remix\b",
    r"\[remix\b",
    r"- remix\b",
    r"\(acoustic\b",
    r"\[acoustic\b",
    r"- acoustic\b",
    r"\(edit\b",
    r"\[edit\b",
    r"- radio edit\b",
    r"single version\b",
    r"\(demo\b",
    r"\[demo\b",
    r"- demo\b",
    r"\(session\b",
    r"\[session\b",
];

/// Substrings that disqualify a lowercased artist name.
pub const UNDESIRABLE_ARTIST_KEYWORDS: &[&str] = &[
    "karaoke",
    "tribute band",
    "the karaoke crew",
    "various artists",
    "soundtrack",
];

static DEFAULT_FILTER: Lazy<CandidateFilter> = Lazy::new(CandidateFilter::new);

/// Filter with precompiled variant patterns.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    patterns: Vec<Regex>,
}

impl CandidateFilter {
    pub fn new() -> Self {
        let patterns = UNDESIRABLE_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { patterns }
    }

    /// True when the title, album or artist marks an unwanted variant.
    pub fn is_undesirable(&self, track: &TrackSuggestion) -> bool {
        let title = track.title.to_lowercase();
        let album = track.album.to_lowercase();
        let artist = track.artist.to_lowercase();

        self.patterns
            .iter()
            .any(|re| re.is_match(&title) || re.is_match(&album))
            || UNDESIRABLE_ARTIST_KEYWORDS
                .iter()
                .any(|k| artist.contains(k))
    }

    /// Keep the suggestions worth resolving, preserving input order.
    pub fn filter(
        &self,
        suggestions: &[TrackSuggestion],
        matched: &MatchAccumulator,
    ) -> Vec<TrackSuggestion> {
        suggestions
            .iter()
            .filter(|s| s.is_complete())
            .filter(|s| !matched.contains(&s.key()))
            .filter(|s| !self.is_undesirable(s))
            .cloned()
            .collect()
    }
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// [`CandidateFilter::filter`] with the shared default filter.
pub fn filter_candidates(
    suggestions: &[TrackSuggestion],
    matched: &MatchAccumulator,
) -> Vec<TrackSuggestion> {
    DEFAULT_FILTER.filter(suggestions, matched)
}
