//! Request Handlers

use super::{errors::ApiError, middleware::RequestId, models::*};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Shared application state
pub struct AppState {
    pub version: String,
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
    })
}

/// POST /api/roll
///
/// Acknowledges the roll; dice are rolled by the engine beside the renderer.
pub async fn roll_handler(Extension(request_id): Extension<RequestId>) -> Json<AckResponse> {
    debug!(request_id = %request_id.0, "roll acknowledged");
    Json(AckResponse { success: true })
}

/// POST /api/games
pub async fn create_game_handler(
    Extension(request_id): Extension<RequestId>,
) -> (StatusCode, Json<GameCreatedResponse>) {
    let id = Uuid::new_v4().to_string();
    debug!(request_id = %request_id.0, game_id = %id, "game record acknowledged");

    (
        StatusCode::CREATED,
        Json(GameCreatedResponse {
            success: true,
            id,
            created_at: Utc::now(),
        }),
    )
}

/// GET /api/games/:id
pub async fn get_game_handler(
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<GameRecordResponse>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| {
        ApiError::bad_request(request_id.0.clone(), format!("Invalid game id: '{}'", id))
    })?;

    Ok(Json(GameRecordResponse {
        id: id.to_string(),
        status: "acknowledged".to_string(),
    }))
}

/// Fallback for unknown API paths
pub async fn api_not_found_handler(Extension(request_id): Extension<RequestId>) -> ApiError {
    ApiError::not_found(request_id.0, "No such endpoint".to_string())
}
