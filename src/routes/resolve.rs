use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{ResolutionRequest, ResolveError, Resolver};
use crate::models::{
    ErrorResponse, HealthResponse, ResolvePoolRequest, ResolveRoomRequest, ResolveRoomResponse,
    ResolutionResult, Room, RoomMember, RoomStatus, RoomSummary,
};
use crate::services::{DirectoryClient, NarrativeClient, RoomServiceClient, RoomServiceError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryClient>,
    pub narrative: Arc<NarrativeClient>,
    pub rooms: Arc<RoomServiceClient>,
    pub resolver: Resolver,
}

/// Configure all resolution-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/resolve", web::post().to(resolve_pool))
        .route("/rooms/{room_id}/resolve", web::post().to(resolve_room));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Resolve a pre-fetched candidate pool
///
/// POST /api/v1/resolve
///
/// Request body:
/// ```json
/// {
///   "roomId": "string",
///   "anchor": {"lat": 52.52, "lng": 13.405},
///   "members": [{ "id": "...", "name": "...", "preferences": {...} }],
///   "listings": [{ "placeId": "...", "name": "...", "lat": 0, "lng": 0 }],
///   "includeExplanations": true
/// }
/// ```
async fn resolve_pool(
    state: web::Data<AppState>,
    req: web::Json<ResolvePoolRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for resolve request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let req = req.into_inner();
    let narrative = req
        .include_explanations
        .then(|| state.narrative.as_ref().clone());

    let request = ResolutionRequest {
        room_id: req.room_id,
        anchor: req.anchor,
        members: req.members,
        listings: req.listings,
    };

    match state.resolver.resolve(request, narrative.as_ref()).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(error) => resolve_error_response(&error),
    }
}

/// Resolve a room end to end
///
/// POST /api/v1/rooms/{roomId}/resolve
///
/// Fetches the room snapshot, flips its status to "resolving", queries the
/// restaurant directory, runs the resolution pipeline, persists the result
/// and reports "complete" - or "error" if anything in the pipeline fails.
async fn resolve_room(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<ResolveRoomRequest>>,
) -> impl Responder {
    let room_id = path.into_inner();
    let options = body.map(web::Json::into_inner).unwrap_or_default();

    let room = match state.rooms.get_room(&room_id).await {
        Ok(room) => room,
        Err(RoomServiceError::NotFound(_)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Room not found".to_string(),
                message: format!("No room with id {}", room_id),
                status_code: 404,
            });
        }
        Err(error) => {
            tracing::error!("Failed to fetch room {}: {}", room_id, error);
            return room_service_error_response(&error);
        }
    };

    tracing::info!(
        "Resolving room {} with {} members",
        room.id,
        room.members.len()
    );

    if let Err(error) = state
        .rooms
        .update_status(&room.id, RoomStatus::Resolving, room.latest_result_id.as_deref())
        .await
    {
        tracing::error!("Failed to mark room {} as resolving: {}", room.id, error);
        return room_service_error_response(&error);
    }

    match run_room_resolution(&state, &room, &options).await {
        Ok(result) => finish_room_resolution(&state, &room, result, &options).await,
        Err(error) => {
            tracing::error!("Resolution failed for room {}: {}", room.id, error);
            mark_room_errored(&state, &room.id).await;
            resolve_error_response(&error)
        }
    }
}

/// Fetch candidates and run the pipeline for one room
async fn run_room_resolution(
    state: &AppState,
    room: &Room,
    options: &ResolveRoomRequest,
) -> Result<ResolutionResult, ResolveError> {
    let anchor = room.anchor();
    let members: Vec<RoomMember> = room.members.values().cloned().collect();

    let listings = state
        .directory
        .fetch_candidates(&room.location.label, anchor, &members)
        .await?;

    let narrative = options
        .include_explanations
        .then(|| state.narrative.as_ref());

    state
        .resolver
        .resolve(
            ResolutionRequest {
                room_id: room.id.clone(),
                anchor,
                members,
                listings,
            },
            narrative,
        )
        .await
}

/// Persist the result and transition the room out of "resolving"
async fn finish_room_resolution(
    state: &AppState,
    room: &Room,
    result: ResolutionResult,
    options: &ResolveRoomRequest,
) -> HttpResponse {
    if options.persist_result {
        if let Err(error) = state.rooms.persist_result(&result).await {
            tracing::error!("Failed to persist result for room {}: {}", room.id, error);
            mark_room_errored(state, &room.id).await;
            return room_service_error_response(&error);
        }
    }

    if let Err(error) = state
        .rooms
        .update_status(&room.id, RoomStatus::Complete, Some(&result.id))
        .await
    {
        tracing::error!("Failed to mark room {} as complete: {}", room.id, error);
        mark_room_errored(state, &room.id).await;
        return room_service_error_response(&error);
    }

    tracing::info!(
        "Room {} resolved: {} ranked, {} eliminated",
        room.id,
        result.ranked_restaurants.len(),
        result.eliminated_count
    );

    HttpResponse::Ok().json(ResolveRoomResponse {
        room: RoomSummary {
            id: room.id.clone(),
            code: room.code.clone(),
            status: RoomStatus::Complete,
            latest_result_id: Some(result.id.clone()),
        },
        result,
    })
}

/// Best-effort transition to "error"; a stale "resolving" flag is worse
/// than a lost status update, so failures here are only logged.
async fn mark_room_errored(state: &AppState, room_id: &str) {
    if let Err(error) = state.rooms.update_status(room_id, RoomStatus::Error, None).await {
        tracing::error!("Failed to mark room {} as errored: {}", room_id, error);
    }
}

fn resolve_error_response(error: &ResolveError) -> HttpResponse {
    match error {
        ResolveError::EmptyMembers | ResolveError::MissingAnchor => {
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid resolution input".to_string(),
                message: error.to_string(),
                status_code: 400,
            })
        }
        ResolveError::Directory(_) => HttpResponse::BadGateway().json(ErrorResponse {
            error: "Directory lookup failed".to_string(),
            message: error.to_string(),
            status_code: 502,
        }),
    }
}

fn room_service_error_response(error: &RoomServiceError) -> HttpResponse {
    HttpResponse::BadGateway().json(ErrorResponse {
        error: "Room service unavailable".to_string(),
        message: error.to_string(),
        status_code: 502,
    })
}
