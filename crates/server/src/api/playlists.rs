//! Playlist generation API handler.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;
use tuneforge_core::{GenerateRequest, GenerationError};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Body returned when a run ends without a single matched track.
#[derive(Debug, Serialize)]
pub struct NoTracksResponse {
    pub message: String,
    pub playlist_name: String,
    pub tracks_found: usize,
}

/// POST /api/v1/playlists/generate
///
/// Runs a full generation and publishes the result. Blocks until the run
/// finishes.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected generate request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid or missing JSON payload")),
            )
                .into_response();
        }
    };

    match state.generation().generate(request).await {
        Ok(summary) if summary.is_empty() => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(NoTracksResponse {
                message: summary.message,
                playlist_name: summary.playlist_name,
                tracks_found: 0,
            }),
        )
            .into_response(),
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => (status_for(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

fn status_for(error: &GenerationError) -> StatusCode {
    match error {
        GenerationError::PromptRequired
        | GenerationError::InvalidSongCount
        | GenerationError::GeneratorNotConfigured
        | GenerationError::NoBackendsAvailable => StatusCode::BAD_REQUEST,
    }
}
