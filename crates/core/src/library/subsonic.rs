//! Subsonic API backend (Navidrome and compatible servers).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::types::{snippet, string_or_number, ConnectionReport, PlaylistOutcome, SearchHit};
use super::{observe, resolved_from_hit, LibraryBackend, LibraryError};
use crate::config::NavidromeConfig;
use crate::track::{BackendKind, ResolvedTrack, TrackSuggestion, UNKNOWN_ALBUM};

const API_VERSION: &str = "1.16.1";
const CLIENT_NAME: &str = "TuneForge";
const SONG_COUNT: &str = "20";

const PING_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const PLAYLIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Normalize a server URL to the Subsonic REST root.
///
/// Trailing slashes are trimmed and `/rest` is appended unless the path
/// already ends with it.
pub fn normalize_base_url(url: &str) -> String {
    let base = url.trim().trim_end_matches('/');
    if base.ends_with("/rest") {
        base.to_string()
    } else {
        format!("{base}/rest")
    }
}

/// Pick the hit for `candidate`: the first exact title and artist match,
/// otherwise the first hit.
pub fn select_subsonic_match<'a>(
    candidate: &TrackSuggestion,
    hits: &'a [SearchHit],
) -> Option<&'a SearchHit> {
    hits.iter()
        .find(|h| h.matches(&candidate.title, &candidate.artist))
        .or_else(|| hits.first())
}

/// Subsonic API client.
///
/// Authenticates with plain `u`/`p` parameters on every call.
pub struct SubsonicBackend {
    client: Client,
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    search_timeout: Duration,
}

impl SubsonicBackend {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::from_parts(Some(url.into()), Some(username.into()), Some(password.into()))
    }

    pub fn from_config(config: &NavidromeConfig) -> Self {
        Self::from_parts(
            config.url.clone(),
            config.username.clone(),
            config.password.clone(),
        )
    }

    fn from_parts(
        url: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            client: Client::new(),
            base_url: non_blank(url).map(|u| normalize_base_url(&u)),
            username: non_blank(username),
            password: non_blank(password),
            search_timeout: SEARCH_TIMEOUT,
        }
    }

    /// Override the per-request search timeout.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// REST root this backend talks to, when configured.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn credentials(&self) -> Result<(&str, &str, &str), LibraryError> {
        match (&self.base_url, &self.username, &self.password) {
            (Some(url), Some(user), Some(pass)) => Ok((url, user, pass)),
            _ => Err(LibraryError::NotConfigured(
                "Navidrome URL, Username, or Password missing.".to_string(),
            )),
        }
    }

    fn auth_params<'a>(user: &'a str, pass: &'a str) -> Vec<(&'static str, &'a str)> {
        vec![
            ("u", user),
            ("p", pass),
            ("v", API_VERSION),
            ("c", CLIENT_NAME),
            ("f", "json"),
        ]
    }

    /// Issue a GET against `{base}/{endpoint}` and unwrap the response envelope.
    async fn call(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<SubsonicBody, LibraryError> {
        let (base, user, pass) = self.credentials()?;
        let url = format!("{base}/{endpoint}");

        let mut params: Vec<(&str, &str)> = Self::auth_params(user, pass);
        params.extend(extra.iter().copied());

        let response = self
            .client
            .get(&url)
            .query(&params)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LibraryError::Protocol {
                status: status.as_u16(),
                message: snippet(&body),
            });
        }

        let text = response.text().await?;
        let envelope: SubsonicEnvelope = serde_json::from_str(&text)
            .map_err(|e| LibraryError::Parse(format!("{e}: {}", snippet(&text))))?;

        envelope.response.into_result()
    }

    /// Keyword search for songs.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, LibraryError> {
        let started = Instant::now();
        let result = self
            .call(
                "search3.view",
                &[
                    ("query", query),
                    ("songCount", SONG_COUNT),
                    ("artistCount", "0"),
                    ("albumCount", "0"),
                ],
                self.search_timeout,
            )
            .await;
        observe(BackendKind::Navidrome, "search", started);

        let songs = result?
            .search_result3
            .map(|r| r.song)
            .unwrap_or_default();

        Ok(songs.into_iter().filter_map(SubsonicSong::into_hit).collect())
    }
}

#[async_trait]
impl LibraryBackend for SubsonicBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Navidrome
    }

    fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    async fn resolve(&self, candidate: &TrackSuggestion) -> Option<ResolvedTrack> {
        if !self.is_configured() {
            return None;
        }

        let query = format!("{} {}", candidate.artist, candidate.title);
        let hits = match self.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query = %query, error = %e, "Navidrome search failed");
                return None;
            }
        };
        debug!(query = %query, count = hits.len(), "Navidrome search results");

        select_subsonic_match(candidate, &hits)
            .map(|hit| resolved_from_hit(hit, BackendKind::Navidrome, candidate))
    }

    async fn create_playlist(
        &self,
        name: &str,
        ids: &[String],
    ) -> Result<PlaylistOutcome, LibraryError> {
        info!(playlist = %name, tracks = ids.len(), "Creating/updating Navidrome playlist");

        let mut params: Vec<(&str, &str)> = vec![("name", name)];
        params.extend(ids.iter().map(|id| ("songId", id.as_str())));

        let started = Instant::now();
        let result = self
            .call("createPlaylist.view", &params, PLAYLIST_TIMEOUT)
            .await;
        observe(BackendKind::Navidrome, "create_playlist", started);

        let body = result.inspect_err(|e| {
            error!(playlist = %name, error = %e, "Navidrome playlist creation failed")
        })?;

        let playlist = body.playlist.unwrap_or_default();
        let id = playlist
            .id
            .ok_or_else(|| LibraryError::Parse("playlist id missing".to_string()))?;

        info!(
            playlist = %name,
            id = %id,
            reported_tracks = ?playlist.song_count,
            "Navidrome playlist saved"
        );

        Ok(PlaylistOutcome {
            id,
            track_count: ids.len(),
        })
    }

    async fn test_connection(&self) -> ConnectionReport {
        let base = match self.credentials() {
            Ok((base, _, _)) => base,
            Err(_) => {
                return ConnectionReport::failed("Navidrome URL, Username, or Password missing.")
            }
        };

        let mut report = ConnectionReport::default();
        report.detail("final_url", base);
        let ping_url = format!("{base}/ping.view");

        match self.call("ping.view", &[], PING_TIMEOUT).await {
            Ok(_) => {
                report.success = true;
                report.message = Some("Successfully connected to Navidrome".to_string());
                match self.call("getSystemInfo.view", &[], PING_TIMEOUT).await {
                    Ok(body) => report.server_info = body.system_info,
                    Err(e) => debug!(error = %e, "System info unavailable"),
                }
            }
            Err(LibraryError::Api { code, message }) => {
                report.error = Some(format!("API Error: {message} (code {code})"));
            }
            Err(LibraryError::Protocol { status, message }) => {
                report.detail("ping_status_code", status);
                report.detail("ping_response_text", message);
                let reason = reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");
                report.error = Some(format!(
                    "HTTP Error: {status} - {reason}. URL: {ping_url}"
                ));
            }
            Err(LibraryError::Timeout) => {
                report.error = Some("Connection timed out".to_string());
            }
            Err(LibraryError::Parse(text)) => {
                report.detail("ping_response_text", text);
                report.error = Some("Could not parse JSON response from server".to_string());
            }
            Err(LibraryError::Transport(_)) => {
                report.error = Some(format!(
                    "Connection error - could not connect to Navidrome server at {base}"
                ));
            }
            Err(e) => report.error = Some(e.to_string()),
        }

        report
    }
}

// ============================================================================
// Subsonic API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SubsonicEnvelope {
    #[serde(rename = "subsonic-response")]
    response: SubsonicBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubsonicBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<SubsonicApiError>,
    #[serde(default)]
    search_result3: Option<SubsonicSearchResult>,
    #[serde(default)]
    playlist: Option<SubsonicPlaylist>,
    #[serde(default)]
    system_info: Option<serde_json::Value>,
}

impl SubsonicBody {
    fn into_result(self) -> Result<Self, LibraryError> {
        if self.status == "ok" {
            return Ok(self);
        }
        let error = self.error.unwrap_or_default();
        Err(LibraryError::Api {
            code: error.code.unwrap_or_default(),
            message: error.message.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct SubsonicApiError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SubsonicSearchResult {
    #[serde(default)]
    song: Vec<SubsonicSong>,
}

#[derive(Debug, Deserialize)]
struct SubsonicSong {
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
}

impl SubsonicSong {
    fn into_hit(self) -> Option<SearchHit> {
        Some(SearchHit {
            id: self.id?,
            title: self.title.unwrap_or_else(|| "Unknown Title".to_string()),
            artist: self.artist.unwrap_or_else(|| "Unknown Artist".to_string()),
            album: self.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            section_id: None,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubsonicPlaylist {
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    #[serde(default)]
    song_count: Option<u64>,
}
