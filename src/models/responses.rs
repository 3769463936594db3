use serde::{Deserialize, Serialize};
use crate::models::domain::{ResolutionResult, RoomStatus};

/// Room projection returned alongside a resolution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: String,
    pub code: String,
    pub status: RoomStatus,
    #[serde(rename = "latestResultId", default)]
    pub latest_result_id: Option<String>,
}

/// Response for the room resolution endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRoomResponse {
    pub room: RoomSummary,
    pub result: ResolutionResult,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
