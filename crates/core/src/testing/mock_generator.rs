//! Mock suggestion generator for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::suggest::{SuggestionGenerator, SuggestionRequest};
use crate::track::TrackSuggestion;

/// A recorded generation request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    pub prompt: String,
    pub desired_count: usize,
    pub attempt_index: u32,
    /// Number of prior suggestions passed in.
    pub prior_count: usize,
}

/// Mock implementation of the SuggestionGenerator trait.
///
/// Replays scripted batches in order; once they run out every call returns
/// an empty batch, as a failing model would.
///
/// # Example
///
/// ```rust,ignore
/// use tuneforge_core::testing::{MockSuggestionGenerator, fixtures};
///
/// let generator = MockSuggestionGenerator::with_batches(vec![
///     vec![],                                      // attempt 1 fails
///     vec![fixtures::suggestion("Africa", "Toto")], // attempt 2
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct MockSuggestionGenerator {
    batches: Arc<RwLock<VecDeque<Vec<TrackSuggestion>>>>,
    requests: Arc<RwLock<Vec<RecordedGeneration>>>,
}

impl MockSuggestionGenerator {
    /// Create a generator that always returns nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator replaying `batches`, one per call.
    pub fn with_batches(batches: Vec<Vec<TrackSuggestion>>) -> Self {
        Self {
            batches: Arc::new(RwLock::new(batches.into())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue another batch.
    pub async fn push_batch(&self, batch: Vec<TrackSuggestion>) {
        self.batches.write().await.push_back(batch);
    }

    /// Requests received so far.
    pub async fn recorded_requests(&self) -> Vec<RecordedGeneration> {
        self.requests.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl SuggestionGenerator for MockSuggestionGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: SuggestionRequest<'_>) -> Vec<TrackSuggestion> {
        self.requests.write().await.push(RecordedGeneration {
            prompt: request.prompt.to_string(),
            desired_count: request.desired_count,
            attempt_index: request.attempt_index,
            prior_count: request.prior_suggestions.len(),
        });
        self.batches.write().await.pop_front().unwrap_or_default()
    }
}
