//! Track suggestion generation.
//!
//! A [`SuggestionGenerator`] turns a free text prompt into a batch of
//! [`TrackSuggestion`](crate::track::TrackSuggestion)s. The shipped
//! implementation prompts an Ollama model through [`LlmClient`] and parses its
//! line oriented `Title - Artist - Album` output.

mod config;
mod generator;
mod llm;
mod parser;
mod prompt;

pub use config::{GeneratorConfig, PreferencesConfig};
pub use generator::{LlmSuggestionGenerator, SuggestionGenerator, SuggestionRequest};
pub use llm::{
    CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage, OllamaClient,
};
pub use parser::{parse_line, parse_suggestions};
pub use prompt::{
    build_exclusion_context, build_generation_prompt, EXCLUSION_LIMIT, EXCLUSION_LOOKBACK,
};
