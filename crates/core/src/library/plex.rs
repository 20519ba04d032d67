//! Plex Media Server backend scoped to one music library section.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::types::{
    count_from_any, snippet, string_or_number, ConnectionReport, LibrarySection, PlaylistOutcome,
    SearchHit,
};
use super::{observe, resolved_from_hit, LibraryBackend, LibraryError};
use crate::config::PlexConfig;
use crate::track::{BackendKind, ResolvedTrack, TrackSuggestion};

/// Plex metadata type for music tracks.
const TRACK_TYPE: &str = "10";

const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
const CREATE_TIMEOUT: Duration = Duration::from_secs(30);
const ADD_ITEMS_TIMEOUT: Duration = Duration::from_secs(60);

/// Pick the hit for `candidate` among results from `section_id`.
///
/// Hits reported in another section are skipped. Only an exact
/// case-insensitive title and artist match is accepted; there is no
/// fallback.
pub fn select_plex_match<'a>(
    candidate: &TrackSuggestion,
    hits: &'a [SearchHit],
    section_id: &str,
) -> Option<&'a SearchHit> {
    hits.iter()
        .filter(|h| match h.section_id.as_deref() {
            Some(section) if !section.is_empty() => section == section_id,
            _ => true,
        })
        .find(|h| h.matches(&candidate.title, &candidate.artist))
}

/// Plex API client.
pub struct PlexBackend {
    client: Client,
    server_url: Option<String>,
    token: Option<String>,
    machine_id: Option<String>,
    section_id: Option<String>,
    playlist_type: String,
    search_timeout: Duration,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl PlexBackend {
    /// Client able to reach the server; add a section and machine id to
    /// resolve and publish.
    pub fn new(server_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            server_url: non_blank(Some(server_url.into()))
                .map(|u| u.trim_end_matches('/').to_string()),
            token: non_blank(Some(token.into())),
            machine_id: None,
            section_id: None,
            playlist_type: "audio".to_string(),
            search_timeout: SEARCH_TIMEOUT,
        }
    }

    pub fn from_config(config: &PlexConfig) -> Self {
        Self {
            client: Client::new(),
            server_url: non_blank(config.server_url.clone())
                .map(|u| u.trim_end_matches('/').to_string()),
            token: non_blank(config.token.clone()),
            machine_id: non_blank(config.machine_id.clone()),
            section_id: non_blank(config.music_section_id.clone()),
            playlist_type: config.playlist_type.clone(),
            search_timeout: SEARCH_TIMEOUT,
        }
    }

    pub fn with_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = non_blank(Some(section_id.into()));
        self
    }

    pub fn with_machine_id(mut self, machine_id: impl Into<String>) -> Self {
        self.machine_id = non_blank(Some(machine_id.into()));
        self
    }

    /// Override the per-request search timeout.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// True when URL and token are present.
    pub fn has_connection(&self) -> bool {
        self.connection().is_ok()
    }

    fn connection(&self) -> Result<(&str, &str), LibraryError> {
        match (&self.server_url, &self.token) {
            (Some(url), Some(token)) => Ok((url, token)),
            _ => Err(LibraryError::NotConfigured(
                "Plex ServerURL or Token not configured.".to_string(),
            )),
        }
    }

    fn item_uri(machine_id: &str, rating_key: &str) -> String {
        format!("server://{machine_id}/com.plexapp.plugins.library/library/metadata/{rating_key}")
    }

    fn request(&self, builder: RequestBuilder, token: &str, timeout: Duration) -> RequestBuilder {
        builder
            .header("X-Plex-Token", token)
            .header("Accept", "application/json")
            .timeout(timeout)
    }

    /// Send a request and decode the `MediaContainer`.
    async fn send(&self, builder: RequestBuilder) -> Result<PlexMediaContainer, LibraryError> {
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(protocol_error(status, &body));
        }

        let text = response.text().await?;
        let parsed: PlexResponse = serde_json::from_str(&text)
            .map_err(|e| LibraryError::Parse(format!("{e}: {}", snippet(&text))))?;
        Ok(parsed.container)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<PlexMediaContainer, LibraryError> {
        let (url, token) = self.connection()?;
        let builder = self
            .client
            .get(format!("{url}{path}"))
            .query(query);
        self.send(self.request(builder, token, timeout)).await
    }

    /// Search the configured section for a track.
    pub async fn search(
        &self,
        title: &str,
        artist: &str,
        album: Option<&str>,
    ) -> Result<Vec<SearchHit>, LibraryError> {
        let section = self
            .section_id
            .as_deref()
            .ok_or_else(|| LibraryError::NotConfigured("Plex music section missing".to_string()))?;

        let mut query = vec![
            ("type", TRACK_TYPE),
            ("title", title),
            ("grandparentTitle", artist),
        ];
        if let Some(album) = album {
            query.push(("parentTitle", album));
        }

        let started = Instant::now();
        let result = self
            .get(
                &format!("/library/sections/{section}/all"),
                &query,
                self.search_timeout,
            )
            .await;
        observe(BackendKind::Plex, "search", started);

        Ok(result?
            .metadata
            .into_iter()
            .filter_map(PlexMetadata::into_hit)
            .collect())
    }

    /// Music library sections (`type == "artist"`).
    pub async fn list_sections(&self) -> Result<Vec<LibrarySection>, LibraryError> {
        let container = self
            .get("/library/sections", &[], IDENTITY_TIMEOUT)
            .await?;

        Ok(container
            .directory
            .into_iter()
            .filter(|d| d.kind.as_deref() == Some("artist"))
            .map(|d| LibrarySection {
                id: d.key.unwrap_or_default(),
                name: d.title.unwrap_or_default(),
                kind: "artist".to_string(),
            })
            .collect())
    }

    /// Server machine identifier, trying `/identity` then `/`.
    pub async fn fetch_machine_identifier(&self) -> Result<Option<String>, LibraryError> {
        for path in ["/identity", "/"] {
            let container = self.get(path, &[], IDENTITY_TIMEOUT).await?;
            if let Some(id) = non_blank(container.machine_identifier) {
                return Ok(Some(id));
            }
            debug!(path, "No machine identifier in response");
        }
        Ok(None)
    }

    async fn add_items(
        &self,
        playlist_key: &str,
        uris: &[String],
    ) -> Result<PlexMediaContainer, LibraryError> {
        let (url, token) = self.connection()?;
        let joined = uris.join(",");
        let builder = self
            .client
            .put(format!("{url}/playlists/{playlist_key}/items"))
            .query(&[("uri", joined.as_str())]);
        self.send(self.request(builder, token, ADD_ITEMS_TIMEOUT))
            .await
    }
}

/// Map an error status to [`LibraryError::Protocol`], preferring the
/// message from a Plex `errors` body.
fn protocol_error(status: StatusCode, body: &str) -> LibraryError {
    let message = serde_json::from_str::<PlexErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next())
        .and_then(|e| e.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
    LibraryError::Protocol {
        status: status.as_u16(),
        message,
    }
}

/// Final track count after appending items.
///
/// Prefers the total reported by the append call, then the initial count
/// plus the reported additions, then the initial count.
fn reconcile_count(initial: usize, appended: Option<&PlexMetadata>) -> usize {
    let Some(meta) = appended else {
        return initial;
    };
    if let Some(total) = meta.leaf_count.or(meta.size) {
        return total;
    }
    match meta.leaf_count_added {
        Some(added) => initial + added,
        None => initial,
    }
}

#[async_trait]
impl LibraryBackend for PlexBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Plex
    }

    fn is_configured(&self) -> bool {
        self.has_connection() && self.machine_id.is_some() && self.section_id.is_some()
    }

    async fn resolve(&self, candidate: &TrackSuggestion) -> Option<ResolvedTrack> {
        if !self.has_connection() {
            return None;
        }
        let section = self.section_id.as_deref()?;

        let album = (!candidate.has_unknown_album()).then_some(candidate.album.as_str());
        let hits = match self.search(&candidate.title, &candidate.artist, album).await {
            Ok(hits) => hits,
            Err(LibraryError::Protocol { status: 404, .. }) => return None,
            Err(e) => {
                warn!(
                    title = %candidate.title,
                    artist = %candidate.artist,
                    error = %e,
                    "Plex search failed"
                );
                return None;
            }
        };
        debug!(
            title = %candidate.title,
            artist = %candidate.artist,
            count = hits.len(),
            "Plex search results"
        );

        select_plex_match(candidate, &hits, section)
            .map(|hit| resolved_from_hit(hit, BackendKind::Plex, candidate))
    }

    async fn create_playlist(
        &self,
        name: &str,
        ids: &[String],
    ) -> Result<PlaylistOutcome, LibraryError> {
        let (url, token) = self.connection()?;
        let machine_id = self
            .machine_id
            .as_deref()
            .ok_or_else(|| LibraryError::NotConfigured("Plex machine ID missing".to_string()))?;
        let (first, rest) = ids.split_first().ok_or(LibraryError::EmptyPlaylist)?;

        let first_uri = Self::item_uri(machine_id, first);
        info!(playlist = %name, first_track = %first, "Creating Plex playlist");

        let started = Instant::now();
        let builder = self.client.post(format!("{url}/playlists")).query(&[
            ("title", name),
            ("smart", "0"),
            ("type", self.playlist_type.as_str()),
            ("uri", first_uri.as_str()),
        ]);
        let created = self
            .send(self.request(builder, token, CREATE_TIMEOUT))
            .await
            .inspect_err(|e| error!(playlist = %name, error = %e, "Plex playlist creation failed"));
        observe(BackendKind::Plex, "create_playlist", started);

        let created = created?;
        let meta = created.metadata.into_iter().next().ok_or_else(|| {
            LibraryError::Parse("playlist metadata missing from create response".to_string())
        })?;
        let key = meta.rating_key.clone().ok_or_else(|| {
            LibraryError::Parse("Could not determine playlist ID from create response".to_string())
        })?;
        let mut track_count = meta.leaf_count.unwrap_or(0);
        info!(playlist = %name, id = %key, initial_items = track_count, "Plex playlist created");

        if !rest.is_empty() {
            let uris: Vec<String> = rest
                .iter()
                .map(|id| Self::item_uri(machine_id, id))
                .collect();
            info!(playlist_id = %key, count = uris.len(), "Adding tracks to Plex playlist");

            let started = Instant::now();
            let appended = self.add_items(&key, &uris).await.inspect_err(|e| {
                error!(playlist = %name, error = %e, "Adding tracks to Plex playlist failed")
            });
            observe(BackendKind::Plex, "add_items", started);

            let appended = appended?;
            if appended.metadata.is_empty() {
                warn!(playlist_id = %key, "Add items response carried no metadata, keeping initial count");
            }
            track_count = reconcile_count(track_count, appended.metadata.first());
        }

        if track_count != ids.len() {
            warn!(
                playlist_id = %key,
                expected = ids.len(),
                actual = track_count,
                "Plex playlist item count mismatch"
            );
        } else {
            info!(playlist_id = %key, tracks = track_count, "Plex playlist saved");
        }

        Ok(PlaylistOutcome {
            id: key,
            track_count,
        })
    }

    async fn test_connection(&self) -> ConnectionReport {
        let (base, token) = match self.connection() {
            Ok(conn) => conn,
            Err(_) => {
                let mut report = ConnectionReport::failed("Plex Server URL or Token missing.");
                report.message = Some("Plex Server URL and Token are required.".to_string());
                return report;
            }
        };

        let identity_url = format!("{base}/identity");
        let mut report = ConnectionReport::default();
        report.detail("attempted_url", identity_url.as_str());

        let builder = self.request(self.client.get(&identity_url), token, IDENTITY_TIMEOUT);
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                report.error = Some(format!(
                    "Plex connection failed: Connection timed out when accessing {identity_url}."
                ));
                report.message = Some("The connection to the Plex server timed out.".to_string());
                return report;
            }
            Err(_) => {
                report.error = Some(format!(
                    "Plex connection failed: Could not connect to server at {base} (tried {identity_url})."
                ));
                report.message = Some(
                    "Unable to establish a connection with the Plex server. Check the URL and network."
                        .to_string(),
                );
                return report;
            }
        };

        let status = response.status();
        report.detail("status_code", status.as_u16());
        let text = response.text().await.unwrap_or_default();
        report.detail("response_snippet", snippet(&text));

        if status == StatusCode::UNAUTHORIZED {
            report.error =
                Some("Plex connection failed: Unauthorized (401). Check your Plex Token.".to_string());
            report.message = Some("Authentication failed. Please verify your Plex token.".to_string());
            return report;
        }
        if status != StatusCode::OK {
            report.error = Some(format!(
                "Plex connection failed: HTTP Error {} when accessing {identity_url}.",
                status.as_u16()
            ));
            report.message = Some(format!("Server returned an HTTP error: {}.", status.as_u16()));
            return report;
        }

        let container = match serde_json::from_str::<PlexResponse>(&text) {
            Ok(parsed) => parsed.container,
            Err(_) => {
                report.error = Some(format!(
                    "Plex connection failed: Could not parse JSON response from {identity_url}."
                ));
                report.message = Some("Received an invalid JSON response from the server.".to_string());
                return report;
            }
        };

        report.server_info = Some(serde_json::json!({
            "friendlyName": container.friendly_name,
            "machineIdentifier": container.machine_identifier,
            "version": container.version,
            "platform": container.platform,
            "platformVersion": container.platform_version,
        }));

        if container.machine_identifier.is_some() {
            report.success = true;
            report.message = Some(format!(
                "Successfully connected to Plex server: {} (Version: {})",
                container.friendly_name.as_deref().unwrap_or("Unknown Name"),
                container.version.as_deref().unwrap_or("Unknown"),
            ));
        } else {
            report.error = Some(
                "Connected, but couldn't retrieve essential server identity (e.g., Machine ID)."
                    .to_string(),
            );
            report.message = Some(
                "Connection attempt returned 200 OK, but the response format was unexpected for server identity."
                    .to_string(),
            );
        }

        report
    }
}

// ============================================================================
// Plex API Response Types (private)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct PlexResponse {
    #[serde(rename = "MediaContainer", default)]
    container: PlexMediaContainer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlexMediaContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexMetadata>,
    #[serde(rename = "Directory", default)]
    directory: Vec<PlexDirectory>,
    #[serde(default)]
    machine_identifier: Option<String>,
    #[serde(default)]
    friendly_name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    platform_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlexMetadata {
    #[serde(default, deserialize_with = "string_or_number")]
    rating_key: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    grandparent_title: Option<String>,
    #[serde(default)]
    parent_title: Option<String>,
    #[serde(rename = "librarySectionID", default, deserialize_with = "string_or_number")]
    library_section_id: Option<String>,
    #[serde(default, deserialize_with = "count_from_any")]
    leaf_count: Option<usize>,
    #[serde(default, deserialize_with = "count_from_any")]
    leaf_count_added: Option<usize>,
    #[serde(default, deserialize_with = "count_from_any")]
    size: Option<usize>,
}

impl PlexMetadata {
    /// Items lacking an id, title or artist are unusable.
    fn into_hit(self) -> Option<SearchHit> {
        let id = non_blank(self.rating_key)?;
        let title = non_blank(self.title)?;
        let artist = non_blank(self.grandparent_title)?;
        Some(SearchHit {
            id,
            title,
            artist,
            album: self.parent_title.unwrap_or_default(),
            section_id: self.library_section_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PlexDirectory {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlexErrorBody {
    #[serde(default)]
    errors: Vec<PlexErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct PlexErrorEntry {
    #[serde(default)]
    message: Option<String>,
}
