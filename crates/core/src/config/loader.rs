use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment variable overrides, e.g. `TUNEFORGE_PLEX__TOKEN`.
const ENV_PREFIX: &str = "TUNEFORGE_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[navidrome]
enabled = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.navidrome.enabled);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[server]
port = "not-a-port"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[generator]
url = "http://localhost:11434"
model = "mistral"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.generator.unwrap().model, "mistral");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[plex]
enabled = true
server_url = "http://plex:32400"
music_section_id = "1"
"#
        )
        .unwrap();

        std::env::set_var("TUNEFORGE_PLEX__MUSIC_SECTION_ID", "3");
        std::env::set_var("TUNEFORGE_PLEX__TOKEN", "4711");
        std::env::set_var("TUNEFORGE_ORCHESTRATOR__MAX_ATTEMPTS", "5");
        let result = load_config(temp_file.path());
        std::env::remove_var("TUNEFORGE_PLEX__MUSIC_SECTION_ID");
        std::env::remove_var("TUNEFORGE_PLEX__TOKEN");
        std::env::remove_var("TUNEFORGE_ORCHESTRATOR__MAX_ATTEMPTS");

        let config = result.unwrap();
        assert_eq!(config.plex.music_section_id.as_deref(), Some("3"));
        assert_eq!(config.plex.token.as_deref(), Some("4711"));
        assert_eq!(config.plex.server_url.as_deref(), Some("http://plex:32400"));
        assert_eq!(config.orchestrator.max_attempts, 5);
    }
}
