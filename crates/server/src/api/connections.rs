//! Connection checks and Plex setup helpers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tuneforge_core::{ConnectionReport, LibraryBackend, LibraryError, PlexBackend, SubsonicBackend};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NavidromeTestRequest {
    pub navidrome_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlexTestRequest {
    pub plex_server_url: Option<String>,
    pub plex_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MachineIdResponse {
    pub machine_identifier: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/connections/navidrome/test
///
/// Checks the credentials in the body. The outcome is in the report, so the
/// status is 200 even when the server could not be reached.
pub async fn test_navidrome(Json(request): Json<NavidromeTestRequest>) -> Json<ConnectionReport> {
    let backend = SubsonicBackend::new(
        request.navidrome_url.unwrap_or_default(),
        request.username.unwrap_or_default(),
        request.password.unwrap_or_default(),
    );
    let report = backend.test_connection().await;
    info!(success = report.success, "Navidrome connection test finished");
    Json(report)
}

/// POST /api/v1/connections/plex/test
pub async fn test_plex(Json(request): Json<PlexTestRequest>) -> Response {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(url), Some(token)) = (
        non_blank(request.plex_server_url),
        non_blank(request.plex_token),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ConnectionReport::failed(
                "Plex Server URL and Token are required in the payload.",
            )),
        )
            .into_response();
    };

    let report = PlexBackend::new(url, token).test_connection().await;
    info!(success = report.success, "Plex connection test finished");
    Json(report).into_response()
}

/// GET /api/v1/plex/libraries
///
/// Music sections of the Plex server from settings.
pub async fn plex_libraries(State(state): State<Arc<AppState>>) -> Response {
    let plex = state.plex();
    if !plex.has_connection() {
        return not_configured();
    }

    match plex.list_sections().await {
        Ok(sections) => Json(sections).into_response(),
        Err(e) => upstream_error(
            e,
            "Failed to fetch Plex libraries",
            "Timeout connecting to Plex server.",
        ),
    }
}

/// GET /api/v1/plex/machine-id
///
/// Machine identifier of the Plex server from settings.
pub async fn plex_machine_id(State(state): State<Arc<AppState>>) -> Response {
    let plex = state.plex();
    if !plex.has_connection() {
        return not_configured();
    }

    match plex.fetch_machine_identifier().await {
        Ok(Some(machine_identifier)) => Json(MachineIdResponse { machine_identifier }).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "Could not determine Plex Machine Identifier from / or /identity.",
            )),
        )
            .into_response(),
        Err(e) => upstream_error(
            e,
            "Failed to fetch Plex machine ID",
            "Timeout connecting to Plex server for machine ID.",
        ),
    }
}

fn not_configured() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("Plex ServerURL or Token not configured.")),
    )
        .into_response()
}

/// Map a Plex failure to a response: timeouts become 504 and HTTP errors
/// keep the upstream status.
fn upstream_error(e: LibraryError, context: &str, timeout_message: &str) -> Response {
    error!(error = %e, "{}", context);
    let (status, message) = match e {
        LibraryError::Timeout => (StatusCode::GATEWAY_TIMEOUT, timeout_message.to_string()),
        LibraryError::Protocol { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("{context}: {message}"),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{context}: {other}"),
        ),
    };
    (status, Json(ErrorResponse::new(message))).into_response()
}
