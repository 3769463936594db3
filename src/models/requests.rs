use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Coordinate, RawListing, RoomMember};

/// Request to resolve a pre-fetched candidate pool
///
/// This is the direct entry point for callers that already hold a member
/// snapshot and raw directory listings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolvePoolRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "room_id", rename = "roomId")]
    pub room_id: String,
    #[serde(default)]
    pub anchor: Option<Coordinate>,
    #[validate(length(min = 1))]
    pub members: Vec<RoomMember>,
    #[serde(default)]
    pub listings: Vec<RawListing>,
    #[serde(rename = "includeExplanations", default = "default_true")]
    pub include_explanations: bool,
}

/// Options for a room-level resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRoomRequest {
    #[serde(rename = "persistResult", default = "default_true")]
    pub persist_result: bool,
    #[serde(rename = "includeExplanations", default = "default_true")]
    pub include_explanations: bool,
}

impl Default for ResolveRoomRequest {
    fn default() -> Self {
        Self {
            persist_result: true,
            include_explanations: true,
        }
    }
}

fn default_true() -> bool {
    true
}
