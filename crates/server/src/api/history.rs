//! Playlist history API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::error;
use tuneforge_core::HistoryEntry;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// GET /api/v1/history
///
/// Every recorded generation, oldest first.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HistoryEntry>>, impl IntoResponse> {
    match state.history().list() {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            error!(error = %e, "Failed to load playlist history");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}
