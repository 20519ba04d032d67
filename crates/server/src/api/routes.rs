use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{connections, handlers, history, middleware::metrics_middleware, playlists};
use crate::metrics::metrics_handler;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Generation and history
        .route("/playlists/generate", post(playlists::generate))
        .route("/history", get(history::list_history))
        // Connection checks
        .route(
            "/connections/navidrome/test",
            post(connections::test_navidrome),
        )
        .route("/connections/plex/test", post(connections::test_plex))
        // Plex setup helpers
        .route("/plex/libraries", get(connections::plex_libraries))
        .route("/plex/machine-id", get(connections::plex_machine_id))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(metrics_middleware)),
        )
}
