//! Route Definitions

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::{path::Path, sync::Arc};
use tower_http::services::{ServeDir, ServeFile};

/// Build the router: stub API endpoints plus the static bundle
///
/// Unknown paths outside `/api` fall back to `index.html` so client-side
/// routes load the app.
pub fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/roll", post(roll_handler))
        .route("/games", post(create_game_handler))
        .route("/games/:id", get(get_game_handler))
        .fallback(api_not_found_handler);

    let assets = ServeDir::new(static_dir)
        .fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .fallback_service(assets)
        .with_state(state)
}
