//! Playlist orchestrator implementation.
//!
//! Drives one generation run through the state machine:
//! Requesting -> Filtering -> Resolving -> Deciding, looping back to
//! Requesting until the target is met (Done) or attempts run out (Exhausted).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::accumulator::MatchAccumulator;
use crate::filter::CandidateFilter;
use crate::library::{resolve_batch, LibraryBackend};
use crate::metrics;
use crate::suggest::{SuggestionGenerator, SuggestionRequest};
use crate::track::{BackendKind, TrackSuggestion};

use super::config::OrchestratorConfig;
use super::types::{next_batch_size, GenerationOutcome, GenerationRequest, RunState};

/// Mutable state of a single run.
struct Run<'a> {
    request: &'a GenerationRequest,
    accumulator: MatchAccumulator,
    /// Every suggestion produced so far, oldest first.
    history: Vec<TrackSuggestion>,
    batch: Vec<TrackSuggestion>,
    eligible: Vec<TrackSuggestion>,
    attempts: u32,
    matched_per_backend: BTreeMap<BackendKind, usize>,
}

impl Run<'_> {
    fn target_met(&self) -> bool {
        self.accumulator.len() >= self.request.target
    }
}

/// Assembles a playlist by alternating between the generator and the
/// library backends.
pub struct PlaylistOrchestrator {
    config: OrchestratorConfig,
    generator: Arc<dyn SuggestionGenerator>,
    backends: Vec<Arc<dyn LibraryBackend>>,
    filter: CandidateFilter,
}

impl PlaylistOrchestrator {
    /// Create a new orchestrator.
    ///
    /// Backends are consulted in [`BackendKind`] order whatever order they
    /// are passed in.
    pub fn new(
        config: OrchestratorConfig,
        generator: Arc<dyn SuggestionGenerator>,
        mut backends: Vec<Arc<dyn LibraryBackend>>,
    ) -> Self {
        backends.sort_by_key(|b| b.kind());
        Self {
            config,
            generator,
            backends,
            filter: CandidateFilter::new(),
        }
    }

    pub fn backends(&self) -> &[Arc<dyn LibraryBackend>] {
        &self.backends
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run until the target is met or attempts are exhausted.
    ///
    /// Never fails: whatever was matched is returned along with the state
    /// the run ended in.
    pub async fn run(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mut run = Run {
            request,
            accumulator: MatchAccumulator::new(),
            history: Vec::new(),
            batch: Vec::new(),
            eligible: Vec::new(),
            attempts: 0,
            matched_per_backend: self.backends.iter().map(|b| (b.kind(), 0)).collect(),
        };

        let mut state = if run.target_met() {
            RunState::Done
        } else {
            RunState::Requesting
        };

        while !state.is_terminal() {
            let next = match state {
                RunState::Requesting => self.request_batch(&mut run).await,
                RunState::Filtering => self.filter_batch(&mut run),
                RunState::Resolving => self.resolve_eligible(&mut run).await,
                RunState::Deciding => self.decide(&run).await,
                RunState::Done | RunState::Exhausted => state,
            };
            debug!(from = %state, to = %next, "Run state transition");
            state = next;
        }

        let found = run.accumulator.len();
        info!(
            prompt = %request.prompt,
            found,
            requested = request.target,
            generator_calls = run.attempts,
            outcome = %state,
            "Generation run finished"
        );

        metrics::GENERATION_RUNS
            .with_label_values(&[state.as_str()])
            .inc();
        metrics::GENERATOR_CALLS_PER_RUN.observe(run.attempts as f64);

        GenerationOutcome {
            tracks: run.accumulator.into_tracks(),
            requested: request.target,
            found,
            generator_calls: run.attempts,
            final_state: state,
            matched_per_backend: run.matched_per_backend,
        }
    }

    fn attempts_remain(&self, run: &Run<'_>) -> bool {
        run.attempts < self.config.max_attempts
    }

    async fn request_batch(&self, run: &mut Run<'_>) -> RunState {
        if !self.attempts_remain(run) {
            return RunState::Exhausted;
        }

        let needed = run.request.target.saturating_sub(run.accumulator.len());
        let desired_count = next_batch_size(needed);
        info!(
            attempt = run.attempts + 1,
            max_attempts = self.config.max_attempts,
            found = run.accumulator.len(),
            target = run.request.target,
            requesting = desired_count,
            "Requesting suggestions"
        );

        let batch = self
            .generator
            .generate(SuggestionRequest {
                prompt: &run.request.prompt,
                desired_count,
                attempt_index: run.attempts,
                prior_suggestions: &run.history,
            })
            .await;
        run.attempts += 1;

        if batch.is_empty() {
            if self.attempts_remain(run) {
                warn!(attempt = run.attempts, "Generator yielded no tracks, retrying");
                pause(self.config.retry_delay_ms).await;
                return RunState::Requesting;
            }
            warn!(attempt = run.attempts, "Generator yielded no tracks, max attempts reached");
            return RunState::Exhausted;
        }

        run.history.extend(batch.iter().cloned());
        run.batch = batch;
        RunState::Filtering
    }

    fn filter_batch(&self, run: &mut Run<'_>) -> RunState {
        run.eligible = self.filter.filter(&run.batch, &run.accumulator);
        info!(
            eligible = run.eligible.len(),
            batch = run.batch.len(),
            "Filtered suggestions"
        );

        if !run.eligible.is_empty() {
            RunState::Resolving
        } else if self.attempts_remain(run) {
            RunState::Requesting
        } else {
            RunState::Exhausted
        }
    }

    async fn resolve_eligible(&self, run: &mut Run<'_>) -> RunState {
        for backend in &self.backends {
            let added = resolve_batch(backend.as_ref(), &run.eligible, &mut run.accumulator).await;
            *run.matched_per_backend.entry(backend.kind()).or_default() += added.len();

            if run.target_met() {
                return RunState::Done;
            }
        }
        RunState::Deciding
    }

    async fn decide(&self, run: &Run<'_>) -> RunState {
        if run.target_met() {
            RunState::Done
        } else if !self.attempts_remain(run) {
            RunState::Exhausted
        } else {
            pause(self.config.round_delay_ms).await;
            RunState::Requesting
        }
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
