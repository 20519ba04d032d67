//! Types for the playlist orchestrator.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::track::{BackendKind, ResolvedTrack};

/// Smallest batch requested from the generator.
pub const MIN_BATCH: usize = 5;

/// Largest batch requested from the generator.
pub const MAX_BATCH: usize = 20;

/// How many suggestions to ask for when `needed` tracks are still missing.
///
/// Asks for twice the shortfall (or the shortfall plus seven when only a few
/// are missing), clamped to [`MIN_BATCH`]..=[`MAX_BATCH`].
pub fn next_batch_size(needed: usize) -> usize {
    let size = if needed <= 3 { needed + 7 } else { needed * 2 };
    size.clamp(MIN_BATCH, MAX_BATCH)
}

/// States of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Requesting,
    Filtering,
    Resolving,
    Deciding,
    /// Target reached.
    Done,
    /// Attempts used up before reaching the target.
    Exhausted,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Requesting => "requesting",
            RunState::Filtering => "filtering",
            RunState::Resolving => "resolving",
            RunState::Deciding => "deciding",
            RunState::Done => "done",
            RunState::Exhausted => "exhausted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Exhausted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of one orchestrator run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Number of tracks wanted.
    pub target: usize,
}

/// Result of one orchestrator run. Partial results are not errors.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Matched tracks in the order they were found.
    pub tracks: Vec<ResolvedTrack>,
    pub requested: usize,
    pub found: usize,
    pub generator_calls: u32,
    /// `Done` or `Exhausted`.
    pub final_state: RunState,
    /// Matches contributed by each backend.
    pub matched_per_backend: BTreeMap<BackendKind, usize>,
}
