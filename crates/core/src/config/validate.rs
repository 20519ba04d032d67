use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Generator URL/model are not blank, sampling parameters are in range
/// - At least one generation attempt is allowed
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(generator) = &config.generator {
        if generator.url.trim().is_empty() || generator.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generator.url and generator.model must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&generator.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "generator.temperature must be within 0.0-2.0, got {}",
                generator.temperature
            )));
        }
        if !(0.0..=1.0).contains(&generator.top_p) {
            return Err(ConfigError::ValidationError(format!(
                "generator.top_p must be within 0.0-1.0, got {}",
                generator.top_p
            )));
        }
    }

    if config.orchestrator.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_attempts cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::suggest::GeneratorConfig;

    fn generator() -> GeneratorConfig {
        GeneratorConfig::new("http://localhost:11434", "llama3")
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config {
            generator: Some(generator()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_blank_model_fails() {
        let mut generator = generator();
        generator.model = " ".to_string();
        let config = Config {
            generator: Some(generator),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_top_p_out_of_range() {
        let mut generator = generator();
        generator.top_p = 1.5;
        let config = Config {
            generator: Some(generator),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("top_p"));
    }

    #[test]
    fn test_validate_zero_attempts_fails() {
        let mut config = Config::default();
        config.orchestrator.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }
}
