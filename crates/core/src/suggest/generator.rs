//! Suggestion generator trait and its LLM backed implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::track::TrackSuggestion;

use super::config::{GeneratorConfig, PreferencesConfig};
use super::llm::{CompletionRequest, LlmClient, LlmError, OllamaClient};
use super::parser::parse_suggestions;
use super::prompt::build_generation_prompt;

/// Input for one generation attempt.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRequest<'a> {
    /// Free text mood or theme.
    pub prompt: &'a str,
    /// How many songs to ask for.
    pub desired_count: usize,
    /// Zero based attempt number within the run.
    pub attempt_index: u32,
    /// Every suggestion produced earlier in the run, oldest first.
    pub prior_suggestions: &'a [TrackSuggestion],
}

/// Source of candidate tracks.
///
/// Implementations never fail: any problem yields an empty batch, which the
/// caller treats as an unproductive attempt.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Name of this generator for logging.
    fn name(&self) -> &str;

    async fn generate(&self, request: SuggestionRequest<'_>) -> Vec<TrackSuggestion>;
}

/// Generator that prompts an [`LlmClient`] and parses its text output.
pub struct LlmSuggestionGenerator {
    client: Arc<dyn LlmClient>,
    preferences: PreferencesConfig,
    temperature: f32,
    top_p: f32,
    context_window: u32,
    log_raw_response: bool,
}

impl LlmSuggestionGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        config: &GeneratorConfig,
        preferences: PreferencesConfig,
    ) -> Self {
        Self {
            client,
            preferences,
            temperature: config.temperature,
            top_p: config.top_p,
            context_window: config.context_window,
            log_raw_response: config.log_raw_response,
        }
    }

    /// Build a generator talking to the Ollama server named in `config`.
    pub fn ollama(config: &GeneratorConfig, preferences: PreferencesConfig) -> Self {
        let client = OllamaClient::new(config.model.clone())
            .with_api_base(config.url.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs));
        Self::new(Arc::new(client), config, preferences)
    }
}

#[async_trait]
impl SuggestionGenerator for LlmSuggestionGenerator {
    fn name(&self) -> &str {
        self.client.provider()
    }

    async fn generate(&self, request: SuggestionRequest<'_>) -> Vec<TrackSuggestion> {
        info!(
            model = self.client.model(),
            attempt = request.attempt_index + 1,
            requested = request.desired_count,
            "Requesting track suggestions"
        );

        let prompt = build_generation_prompt(
            request.prompt,
            request.desired_count,
            request.attempt_index,
            request.prior_suggestions,
            &self.preferences,
        );

        let completion = CompletionRequest::new(prompt)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_context_window(self.context_window);

        let response = match self.client.complete(completion).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    LlmError::Timeout(after) => {
                        error!(timeout = ?after, "Suggestion request timed out")
                    }
                    _ => error!(error = %e, "Suggestion request failed"),
                }
                metrics::GENERATOR_CALLS.with_label_values(&["error"]).inc();
                return Vec::new();
            }
        };

        let provider = self.client.provider();
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "input"])
            .inc_by(response.usage.input_tokens as u64);
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "output"])
            .inc_by(response.usage.output_tokens as u64);

        if self.log_raw_response {
            debug!(raw = %response.text, "Raw generator response");
        }

        let text = response.text.trim();
        if text.is_empty() {
            warn!("Generator response content is empty");
            metrics::GENERATOR_CALLS.with_label_values(&["empty"]).inc();
            return Vec::new();
        }

        let tracks = parse_suggestions(text);
        info!(count = tracks.len(), "Parsed track suggestions");

        let label = if tracks.is_empty() { "empty" } else { "ok" };
        metrics::GENERATOR_CALLS.with_label_values(&[label]).inc();
        metrics::SUGGESTIONS_PARSED.inc_by(tracks.len() as u64);

        tracks
    }
}
