//! Policy variants attached to scopes
//!
//! Each scope resolves to exactly one policy. The set is a closed tagged
//! variant so the evaluation rules are exhaustively checkable; adding a
//! variant is a compile-time-visible change everywhere policies are matched.

use serde::{Deserialize, Serialize};

/// The rule attached to a scope.
///
/// `level` is always a point on the 0-10 trust lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "level", rename_all = "snake_case")]
pub enum Policy {
    /// Subject must hold clearance >= `level`. The target is ignored; scopes
    /// with this policy govern instance-wide actions.
    Absolute(u8),

    /// Subject must hold clearance >= `level` plus the organizational
    /// distance penalty to the target, or >= 7 globally. Requires a target.
    Distanced(u8),

    /// Governs setting the target's clearance to `level`. Requires a target
    /// distinct from the subject; the subject must out-rank the distance
    /// penalty, the new level, and the target's current level.
    ClearanceEdit(u8),
}

impl Policy {
    /// The lattice level this policy is anchored at
    pub fn level(&self) -> u8 {
        match self {
            Policy::Absolute(level) | Policy::Distanced(level) | Policy::ClearanceEdit(level) => {
                *level
            }
        }
    }

    /// Whether evaluation of this policy requires a target user
    pub fn requires_target(&self) -> bool {
        match self {
            Policy::Absolute(_) => false,
            Policy::Distanced(_) | Policy::ClearanceEdit(_) => true,
        }
    }
}
