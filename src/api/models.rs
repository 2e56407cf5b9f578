//! API Response Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Bare acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}

/// Acknowledgement of a new game record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCreatedResponse {
    pub success: bool,
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Static view of a game record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecordResponse {
    pub id: String,
    pub status: String,
}
