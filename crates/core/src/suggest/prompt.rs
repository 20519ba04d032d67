//! Generation prompt construction.

use std::collections::HashSet;

use crate::track::{MatchKey, TrackSuggestion};

use super::config::PreferencesConfig;

/// How many of the most recent suggestions are scanned for the exclusion list.
pub const EXCLUSION_LOOKBACK: usize = 50;

/// Maximum distinct tracks listed in the exclusion list.
pub const EXCLUSION_LIMIT: usize = 15;

const RETRY_GUIDANCE: &str = "IMPORTANT: Your previous suggestions might have included repeats, \
undesirable versions, or didn't match well. Please provide COMPLETELY DIFFERENT suggestions this time. \
Focus on well-known, studio-recorded songs. Strongly AVOID live versions, instrumentals, karaoke, \
covers, remixes, demos, and edits unless the prompt specifically asks for them. \
Ensure variety in your new suggestions.";

/// Distinct recent suggestions the model should not repeat, most recent first.
///
/// Only the last [`EXCLUSION_LOOKBACK`] suggestions are considered, entries
/// without title or artist are skipped, and the result is capped at
/// [`EXCLUSION_LIMIT`].
pub fn build_exclusion_context(prior: &[TrackSuggestion]) -> Vec<&TrackSuggestion> {
    let start = prior.len().saturating_sub(EXCLUSION_LOOKBACK);
    let mut seen: HashSet<MatchKey> = HashSet::new();
    let mut recent = Vec::new();

    for track in prior[start..].iter().rev() {
        if !track.is_complete() {
            continue;
        }
        if seen.insert(track.key()) {
            recent.push(track);
        }
        if recent.len() >= EXCLUSION_LIMIT {
            break;
        }
    }

    recent
}

/// Build the instruction sent to the model for one attempt.
///
/// `attempt_index` is zero based; exclusion and retry guidance are only
/// added from the second attempt on.
pub fn build_generation_prompt(
    prompt: &str,
    desired_count: usize,
    attempt_index: u32,
    prior: &[TrackSuggestion],
    preferences: &PreferencesConfig,
) -> String {
    let mut text = format!(
        "You are a helpful music expert. Generate a list of exactly {desired_count} unique songs \
based on the following prompt: '{prompt}'.\n\
User Likes: {likes}\n\
User Dislikes: {dislikes}\n\
User Favorite Artists: {favorites}\n\
Format each song strictly as 'Title - Artist - Album'. If an album is not applicable or known, use 'Unknown Album'.\n\
Each song must be on a new line. Do not include numbering, introductory/closing remarks, or any other text, \
just the songs in the specified format.",
        likes = preferences.likes,
        dislikes = preferences.dislikes,
        favorites = preferences.favorite_artists,
    );

    if attempt_index == 0 {
        return text;
    }

    let excluded = build_exclusion_context(prior);
    if !excluded.is_empty() {
        text.push_str(
            "\n\nTo avoid repetition, DO NOT suggest any of the following tracks again:\n",
        );
        // Listed oldest first so the prompt reads chronologically.
        let lines: Vec<String> = excluded
            .iter()
            .rev()
            .map(|t| format!("- '{}' by '{}'", t.title, t.artist))
            .collect();
        text.push_str(&lines.join("\n"));
    }

    text.push_str("\n\n");
    text.push_str(RETRY_GUIDANCE);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> Vec<TrackSuggestion> {
        (0..count)
            .map(|i| TrackSuggestion::new(format!("Song {i}"), format!("Artist {i}")))
            .collect()
    }

    #[test]
    fn test_exclusion_context_dedupes_and_caps() {
        // 60 suggestions, the last 5 repeat earlier (title, artist) pairs.
        let mut prior = numbered(55);
        for i in 50..55 {
            prior.push(TrackSuggestion::new(
                format!("SONG {i}"),
                format!("artist {i}"),
            ));
        }
        assert_eq!(prior.len(), 60);

        let context = build_exclusion_context(&prior);
        assert_eq!(context.len(), EXCLUSION_LIMIT);

        let keys: HashSet<MatchKey> = context.iter().map(|t| t.key()).collect();
        assert_eq!(keys.len(), context.len());

        // Most recent first: the newest entry is the duplicate of Song 54.
        assert_eq!(context[0].title, "SONG 54");
        assert_eq!(context[4].title, "SONG 50");
        assert_eq!(context[5].title, "Song 49");
        assert_eq!(context[14].title, "Song 40");
    }

    #[test]
    fn test_exclusion_context_only_looks_back_fifty() {
        // Two distinct songs, then 50 repeats of a third.
        let mut prior = vec![
            TrackSuggestion::new("Old A", "X"),
            TrackSuggestion::new("Old B", "Y"),
        ];
        prior.extend((0..50).map(|_| TrackSuggestion::new("Loop", "Z")));

        let context = build_exclusion_context(&prior);
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].title, "Loop");
    }

    #[test]
    fn test_exclusion_context_skips_incomplete() {
        let prior = vec![
            TrackSuggestion::new("", "Nobody"),
            TrackSuggestion::new("Real", "Artist"),
        ];
        let context = build_exclusion_context(&prior);
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].title, "Real");
    }

    #[test]
    fn test_first_attempt_prompt_has_no_exclusions() {
        let prefs = PreferencesConfig {
            likes: "synths".to_string(),
            dislikes: "polka".to_string(),
            favorite_artists: "Kraftwerk".to_string(),
        };
        let prior = numbered(3);
        let text = build_generation_prompt("rainy night drive", 12, 0, &prior, &prefs);

        assert!(text.contains("exactly 12 unique songs"));
        assert!(text.contains("'rainy night drive'"));
        assert!(text.contains("User Likes: synths"));
        assert!(text.contains("User Dislikes: polka"));
        assert!(text.contains("User Favorite Artists: Kraftwerk"));
        assert!(text.contains("'Title - Artist - Album'"));
        assert!(!text.contains("DO NOT suggest"));
        assert!(!text.contains("IMPORTANT"));
    }

    #[test]
    fn test_retry_prompt_lists_exclusions_chronologically() {
        let prior = vec![
            TrackSuggestion::new("First", "A"),
            TrackSuggestion::new("Second", "B"),
        ];
        let text =
            build_generation_prompt("upbeat", 8, 1, &prior, &PreferencesConfig::default());

        let first = text.find("- 'First' by 'A'").unwrap();
        let second = text.find("- 'Second' by 'B'").unwrap();
        assert!(first < second);
        assert!(text.contains("COMPLETELY DIFFERENT"));
        assert!(text.contains("karaoke"));
    }

    #[test]
    fn test_retry_prompt_without_history_still_has_guidance() {
        let text = build_generation_prompt("jazz", 5, 2, &[], &PreferencesConfig::default());
        assert!(!text.contains("DO NOT suggest"));
        assert!(text.contains("IMPORTANT"));
    }
}
