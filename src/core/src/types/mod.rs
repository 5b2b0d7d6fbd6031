//! Shared types for the Helio broker

pub mod ids;
pub mod org;

// Re-export commonly used types
pub use ids::{AllianceId, CharacterId, CoalitionId, CorporationId};
pub use org::{Alliance, Coalition, Corporation, User, MAX_CLEARANCE};
