// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Candidate, Coordinate, DietaryRestriction, Elimination, MemberPreferences, RankedRestaurant,
    RawListing, ResolutionResult, Room, RoomLocation, RoomMember, RoomStatus, ScoreBreakdown,
    ScoringWeights, Vibe,
};
pub use requests::{ResolvePoolRequest, ResolveRoomRequest};
pub use responses::{ErrorResponse, HealthResponse, ResolveRoomResponse, RoomSummary};
