use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::models::{ResolutionResult, Room, RoomStatus};

/// Errors that can occur when talking to the room service
#[derive(Debug, Error)]
pub enum RoomServiceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Room service returned status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// REST client for the room subsystem
///
/// Rooms, membership and result persistence live outside this service; this
/// client only reads snapshots, flips status flags and hands results over.
pub struct RoomServiceClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RoomServiceClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch a room snapshot (members, preferences, location, status)
    pub async fn get_room(&self, room_id: &str) -> Result<Room, RoomServiceError> {
        let url = self.url(&format!("rooms/{}", room_id));

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RoomServiceError::NotFound(room_id.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(RoomServiceError::ApiError { status, body });
        }

        response
            .json::<Room>()
            .await
            .map_err(|e| RoomServiceError::InvalidResponse(format!("Failed to parse room: {}", e)))
    }

    /// Transition the room's external status flag
    pub async fn update_status(
        &self,
        room_id: &str,
        status: RoomStatus,
        latest_result_id: Option<&str>,
    ) -> Result<(), RoomServiceError> {
        let url = self.url(&format!("rooms/{}/status", room_id));

        let mut payload = serde_json::json!({ "status": status });
        if let Some(result_id) = latest_result_id {
            payload["latestResultId"] = serde_json::Value::String(result_id.to_string());
        }

        let response = self
            .client
            .patch(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(RoomServiceError::ApiError { status, body });
        }

        Ok(())
    }

    /// Hand a finished resolution result to the persistence layer
    pub async fn persist_result(&self, result: &ResolutionResult) -> Result<(), RoomServiceError> {
        let url = self.url(&format!("rooms/{}/results/{}", result.room_id, result.id));

        let response = self
            .client
            .put(&url)
            .header("X-Api-Key", &self.api_key)
            .json(result)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(RoomServiceError::ApiError { status, body });
        }

        tracing::debug!("Persisted resolution result {} for room {}", result.id, result.room_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: String) -> RoomServiceClient {
        RoomServiceClient::new(base_url, "test_key".to_string(), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_get_room_parses_snapshot() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rooms/room1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "id": "room1",
                    "code": "ABCD",
                    "status": "lobby",
                    "location": {"label": "Berlin", "lat": 52.52, "lng": 13.405},
                    "members": {
                        "m1": {
                            "id": "m1",
                            "name": "Ana",
                            "isHost": true,
                            "preferences": {
                                "budgetMax": 2,
                                "dietaryRestrictions": ["vegetarian"],
                                "cuisinePreferences": ["italian"],
                                "vibePreference": "quiet",
                                "maxDistanceMeters": 2000
                            }
                        }
                    }
                }"#,
            )
            .create_async()
            .await;

        let rooms = client(server.url());
        let room = rooms.get_room("room1").await.unwrap();

        assert_eq!(room.id, "room1");
        assert_eq!(room.members.len(), 1);
        assert!(room.anchor().is_some());
        let member = room.members.get("m1").unwrap();
        assert_eq!(member.preferences.budget_max, 2);
        assert_eq!(member.preferences.max_distance_meters, Some(2000.0));
    }

    #[tokio::test]
    async fn test_get_room_maps_404_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rooms/missing")
            .with_status(404)
            .create_async()
            .await;

        let rooms = client(server.url());
        let err = rooms.get_room("missing").await.unwrap_err();

        assert!(matches!(err, RoomServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_status_serializes_flag() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rooms/room1/status")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "status": "resolving"
            })))
            .with_status(204)
            .create_async()
            .await;

        let rooms = client(server.url());
        rooms
            .update_status("room1", RoomStatus::Resolving, None)
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
