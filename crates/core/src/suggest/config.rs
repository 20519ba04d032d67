//! Suggestion generator configuration types.

use serde::{Deserialize, Serialize};

/// Text generation backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Ollama server URL.
    pub url: String,
    /// Model name/identifier.
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Context window in tokens.
    #[serde(default = "default_context_window")]
    pub context_window: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Log the raw model output at debug level.
    #[serde(default)]
    pub log_raw_response: bool,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_context_window() -> u32 {
    2048
}

fn default_timeout() -> u64 {
    120
}

impl GeneratorConfig {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            context_window: default_context_window(),
            timeout_secs: default_timeout(),
            log_raw_response: false,
        }
    }
}

/// Listener taste hints embedded in every generation prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default)]
    pub likes: String,
    #[serde(default)]
    pub dislikes: String,
    #[serde(default)]
    pub favorite_artists: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            url = "http://localhost:11434"
            model = "llama3"
        "#;
        let config: GeneratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_p, 0.9);
        assert_eq!(config.context_window, 2048);
        assert_eq!(config.timeout_secs, 120);
        assert!(!config.log_raw_response);
    }

    #[test]
    fn test_missing_model_fails() {
        let toml = r#"url = "http://localhost:11434""#;
        let result: Result<GeneratorConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
