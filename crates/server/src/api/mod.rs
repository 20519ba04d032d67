pub mod connections;
pub mod handlers;
pub mod history;
pub mod middleware;
pub mod playlists;
pub mod routes;

pub use handlers::ErrorResponse;
pub use routes::create_router;
