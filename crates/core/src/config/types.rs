use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::library::string_or_number;
use crate::orchestrator::OrchestratorConfig;
use crate::suggest::{GeneratorConfig, PreferencesConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Text generation backend. Playlist generation is refused when absent.
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub navidrome: NavidromeConfig,
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5395
}

/// Database configuration (playlist history lives here)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tuneforge.db")
}

/// Logging configuration.
///
/// `RUST_LOG` still wins over `level` when set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info,tower_http=debug".to_string()
}

/// Navidrome (Subsonic API) backend configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NavidromeConfig {
    /// Whether this backend takes part in playlist generation.
    #[serde(default)]
    pub enabled: bool,
    /// Server URL, with or without the trailing `/rest`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub password: Option<String>,
}

impl NavidromeConfig {
    /// True when URL, username and password are all present.
    pub fn is_complete(&self) -> bool {
        [&self.url, &self.username, &self.password]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Plex backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlexConfig {
    /// Whether this backend takes part in playlist generation.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub token: Option<String>,
    /// Server machine identifier, used to build playlist item URIs.
    #[serde(default, deserialize_with = "string_or_number")]
    pub machine_id: Option<String>,
    /// Library section searched for tracks.
    #[serde(default, deserialize_with = "string_or_number")]
    pub music_section_id: Option<String>,
    #[serde(default = "default_playlist_type")]
    pub playlist_type: String,
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: None,
            token: None,
            machine_id: None,
            music_section_id: None,
            playlist_type: default_playlist_type(),
        }
    }
}

fn default_playlist_type() -> String {
    "audio".to_string()
}

impl PlexConfig {
    /// True when everything needed for searching and playlist creation is present.
    pub fn is_complete(&self) -> bool {
        [
            &self.server_url,
            &self.token,
            &self.machine_id,
            &self.music_section_id,
        ]
        .iter()
        .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// True when the server can at least be contacted (URL and token present).
    pub fn has_connection(&self) -> bool {
        [&self.server_url, &self.token]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
    pub preferences: PreferencesConfig,
    pub navidrome: SanitizedNavidromeConfig,
    pub plex: SanitizedPlexConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Sanitized Navidrome config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNavidromeConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password_configured: bool,
}

/// Sanitized Plex config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPlexConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    pub token_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_section_id: Option<String>,
    pub playlist_type: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            logging: config.logging.clone(),
            generator: config.generator.clone(),
            preferences: config.preferences.clone(),
            navidrome: SanitizedNavidromeConfig {
                enabled: config.navidrome.enabled,
                url: config.navidrome.url.clone(),
                username: config.navidrome.username.clone(),
                password_configured: config
                    .navidrome
                    .password
                    .as_deref()
                    .is_some_and(|p| !p.is_empty()),
            },
            plex: SanitizedPlexConfig {
                enabled: config.plex.enabled,
                server_url: config.plex.server_url.clone(),
                token_configured: config.plex.token.as_deref().is_some_and(|t| !t.is_empty()),
                machine_id: config.plex.machine_id.clone(),
                music_section_id: config.plex.music_section_id.clone(),
                playlist_type: config.plex.playlist_type.clone(),
            },
            orchestrator: config.orchestrator.clone(),
        }
    }
}
