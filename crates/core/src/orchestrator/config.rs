//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the playlist orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum generator calls per run.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after a generator call returned nothing (milliseconds).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Pause between resolution rounds (milliseconds).
    #[serde(default = "default_round_delay")]
    pub round_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000 // 1 second
}

fn default_round_delay() -> u64 {
    500
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
            round_delay_ms: default_round_delay(),
        }
    }
}

impl OrchestratorConfig {
    /// Configuration without pauses, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            retry_delay_ms: 0,
            round_delay_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.round_delay_ms, 500);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            max_attempts = 5
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay_ms, 1000);
    }
}
