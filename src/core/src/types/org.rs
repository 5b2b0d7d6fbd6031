//! Organization data model
//!
//! A read-mostly view over the four-level hierarchy synchronized from the
//! external game API:
//!
//! ```text
//! Coalition ⊇ Alliance ⊇ Corporation ⊇ User
//! ```
//!
//! These records are inputs to the clearance engine; the engine never mutates
//! them except for the clearance level written back by `reset_clearance`.

use crate::types::ids::{AllianceId, CharacterId, CoalitionId, CorporationId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum clearance level on the trust lattice
pub const MAX_CLEARANCE: u8 = 10;

/// One principal: a character authenticated against the broker.
///
/// Invariant: `clearance_level` is always in `[0, 10]`. Construction and
/// mutation go through [`User::new`] and [`User::set_clearance`], which clamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Character identifier from the game API
    pub id: CharacterId,

    /// Display name
    pub name: String,

    /// Trust level on the 0-10 lattice
    clearance_level: u8,

    /// Corporation this character belongs to, if any
    pub corporation_id: Option<CorporationId>,
}

impl User {
    /// Create a new user, clamping the clearance level into `[0, 10]`
    pub fn new(
        id: CharacterId,
        name: impl Into<String>,
        clearance_level: u8,
        corporation_id: Option<CorporationId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            clearance_level: clearance_level.min(MAX_CLEARANCE),
            corporation_id,
        }
    }

    /// Current clearance level
    pub fn clearance_level(&self) -> u8 {
        self.clearance_level
    }

    /// Set the clearance level, clamping into `[0, 10]`.
    ///
    /// This is a plain field mutation; authorization of the change is the
    /// clearance engine's job (`helio.set_clearance_level_N` scopes).
    pub fn set_clearance(&mut self, level: u8) {
        self.clearance_level = level.min(MAX_CLEARANCE);
    }

    /// Whether this is the distinguished root identity
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }
}

/// One corporation, optionally belonging to an alliance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corporation {
    pub id: CorporationId,
    pub name: String,
    pub ticker: String,

    /// Character leading this corporation
    pub ceo_id: CharacterId,

    /// Alliance membership, if any
    pub alliance_id: Option<AllianceId>,
}

/// One alliance. Belongs to zero or more coalitions (back-references held by
/// [`Coalition::members`]) and is led by one executor corporation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alliance {
    pub id: AllianceId,
    pub name: String,
    pub ticker: String,

    /// Corporation executing this alliance
    pub executor_corporation_id: CorporationId,
}

/// One coalition: a named set of member alliances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coalition {
    pub id: CoalitionId,
    pub name: String,

    /// Member alliances
    pub members: HashSet<AllianceId>,
}

impl Coalition {
    /// Whether the given alliance is a member of this coalition
    pub fn contains(&self, alliance: AllianceId) -> bool {
        self.members.contains(&alliance)
    }
}
