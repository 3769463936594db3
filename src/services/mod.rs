// Service exports
pub mod directory;
pub mod narrative;
pub mod rooms;

pub use directory::{DirectoryClient, DirectoryError};
pub use narrative::{ExplanationPrompt, NarrativeClient, NarrativeError};
pub use rooms::{RoomServiceClient, RoomServiceError};
