//! # Helio Core
//!
//! Shared types for the Helio authentication/authorization broker: identifier
//! newtypes, the organization data model (characters, corporations, alliances,
//! coalitions), time helpers, and the unified error type. This package breaks
//! circular dependencies between the clearance and token packages.

pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    Alliance, AllianceId, CharacterId, Coalition, CoalitionId, Corporation, CorporationId, User,
    MAX_CLEARANCE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
