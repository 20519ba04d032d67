//! Run scoped collection of resolved tracks.

use std::collections::HashSet;

use crate::track::{BackendKind, MatchKey, ResolvedTrack};

/// Resolved tracks keyed by the originating suggestion's [`MatchKey`].
///
/// Keys are never overwritten or removed. Tracks are exported in insertion
/// order. The accumulator may end up larger than a run's target when the
/// final resolution batch overshoots; that is not corrected here.
#[derive(Debug, Default, Clone)]
pub struct MatchAccumulator {
    keys: HashSet<MatchKey>,
    tracks: Vec<ResolvedTrack>,
}

impl MatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `track` under its suggestion's key unless that key is taken.
    ///
    /// Returns `true` when the track was added.
    pub fn insert_if_absent(&mut self, track: ResolvedTrack) -> bool {
        let key = track.original_suggestion.key();
        if !self.keys.insert(key) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn contains(&self, key: &MatchKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MatchKey> {
        self.keys.iter()
    }

    pub fn tracks(&self) -> &[ResolvedTrack] {
        &self.tracks
    }

    /// Backend ids of the tracks resolved by `kind`, in insertion order.
    pub fn ids_for(&self, kind: BackendKind) -> Vec<String> {
        ids_for(&self.tracks, kind)
    }

    /// Number of tracks resolved by `kind`.
    pub fn count_for(&self, kind: BackendKind) -> usize {
        self.tracks.iter().filter(|t| t.backend == kind).count()
    }

    pub fn into_tracks(self) -> Vec<ResolvedTrack> {
        self.tracks
    }
}

/// Backend ids of the tracks in `tracks` resolved by `kind`.
pub fn ids_for(tracks: &[ResolvedTrack], kind: BackendKind) -> Vec<String> {
    tracks
        .iter()
        .filter(|t| t.backend == kind)
        .map(|t| t.backend_id.clone())
        .collect()
}
