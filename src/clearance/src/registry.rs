//! Scope registry
//!
//! Static mapping from scope name to policy. Built once at startup and shared
//! read-only with the engine; unknown scope names are a hard deny at
//! evaluation time, never a crash.

use crate::policy::Policy;
use std::collections::HashMap;

/// Broker-administrative scope names
pub mod scopes {
    /// Delete a user record (cascades to their tokens)
    pub const DELETE_USER: &str = "helio.delete_user";
    /// Read coalition records
    pub const READ_COALITION: &str = "helio.read_coalition";
    /// Create or update coalition records
    pub const WRITE_COALITION: &str = "helio.write_coalition";
    /// Read group records
    pub const READ_GROUP: &str = "helio.read_group";
    /// Create a group
    pub const CREATE_GROUP: &str = "helio.create_group";
    /// Delete a group
    pub const DELETE_GROUP: &str = "helio.delete_group";
    /// Update group membership
    pub const WRITE_GROUP: &str = "helio.write_group";
    /// List and inspect one's own tokens
    pub const READ_OWN_TOKEN: &str = "helio.read_own_token";
    /// Issue or revoke dynamic app tokens
    pub const WRITE_DYN_TOKEN: &str = "helio.write_dyn_token";
    /// Issue or revoke permanent app tokens
    pub const WRITE_PER_TOKEN: &str = "helio.write_per_token";
    /// Revoke user tokens
    pub const WRITE_USE_TOKEN: &str = "helio.write_use_token";

    /// Name of the clearance-edit scope for the given level
    pub fn set_clearance_level(level: u8) -> String {
        format!("helio.set_clearance_level_{}", level)
    }
}

/// Immutable scope-to-policy mapping.
///
/// The built-in table covers the broker's own administrative scopes, the
/// eleven clearance-edit scopes, and the game-API capability scopes proxied
/// on behalf of users. Deployments extend it through [`ScopeRegistry::builder`].
#[derive(Debug, Clone)]
pub struct ScopeRegistry {
    policies: HashMap<String, Policy>,
}

impl ScopeRegistry {
    /// Registry with the built-in scope table
    pub fn builtin() -> Self {
        Self::builder().with_builtin_scopes().build()
    }

    /// Empty registry builder
    pub fn builder() -> ScopeRegistryBuilder {
        ScopeRegistryBuilder {
            policies: HashMap::new(),
        }
    }

    /// Look up the policy for a scope name. `None` means the scope is
    /// unknown; the engine treats that as a misconfiguration and denies.
    pub fn get(&self, scope: &str) -> Option<Policy> {
        self.policies.get(scope).copied()
    }

    /// Whether the registry knows this scope name
    pub fn contains(&self, scope: &str) -> bool {
        self.policies.contains_key(scope)
    }

    /// Number of registered scopes
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Iterate over registered scope names
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(|s| s.as_str())
    }
}

/// Builder for [`ScopeRegistry`]
pub struct ScopeRegistryBuilder {
    policies: HashMap<String, Policy>,
}

impl ScopeRegistryBuilder {
    /// Register one scope. Later registrations win, so deployments can
    /// override built-in levels.
    pub fn scope(mut self, name: impl Into<String>, policy: Policy) -> Self {
        self.policies.insert(name.into(), policy);
        self
    }

    /// Register the built-in scope table
    pub fn with_builtin_scopes(mut self) -> Self {
        use Policy::{Absolute, Distanced};

        // Broker-administrative scopes
        let admin: &[(&str, Policy)] = &[
            (scopes::DELETE_USER, Absolute(9)),
            (scopes::READ_COALITION, Absolute(0)),
            (scopes::WRITE_COALITION, Absolute(9)),
            (scopes::READ_GROUP, Absolute(0)),
            (scopes::CREATE_GROUP, Absolute(9)),
            (scopes::DELETE_GROUP, Absolute(9)),
            (scopes::WRITE_GROUP, Absolute(9)),
            (scopes::READ_OWN_TOKEN, Absolute(0)),
            (scopes::WRITE_DYN_TOKEN, Absolute(10)),
            (scopes::WRITE_PER_TOKEN, Absolute(10)),
            (scopes::WRITE_USE_TOKEN, Absolute(0)),
        ];
        for (name, policy) in admin {
            self.policies.insert((*name).to_string(), *policy);
        }

        // Clearance-edit scopes, one per lattice level
        for level in 0..=10u8 {
            self.policies
                .insert(scopes::set_clearance_level(level), Policy::ClearanceEdit(level));
        }

        // Game-API capability scopes, checked against the user whose data is
        // proxied. Read capabilities sit at 0, write capabilities at 1.
        let capabilities: &[(&str, Policy)] = &[
            ("esi-assets.read_assets.v1", Distanced(0)),
            ("esi-assets.read_corporation_assets.v1", Distanced(0)),
            ("esi-calendar.read_calendar_events.v1", Distanced(0)),
            ("esi-calendar.respond_calendar_events.v1", Distanced(1)),
            ("esi-characters.read_contacts.v1", Distanced(0)),
            ("esi-characters.read_corporation_roles.v1", Distanced(0)),
            ("esi-characters.read_notifications.v1", Distanced(0)),
            ("esi-characters.read_titles.v1", Distanced(0)),
            ("esi-characters.write_contacts.v1", Distanced(1)),
            ("esi-clones.read_clones.v1", Distanced(0)),
            ("esi-contracts.read_character_contracts.v1", Distanced(0)),
            ("esi-corporations.read_corporation_membership.v1", Distanced(0)),
            ("esi-fittings.read_fittings.v1", Distanced(0)),
            ("esi-fittings.write_fittings.v1", Distanced(1)),
            ("esi-fleets.read_fleet.v1", Distanced(0)),
            ("esi-fleets.write_fleet.v1", Distanced(1)),
            ("esi-industry.read_character_jobs.v1", Distanced(0)),
            ("esi-killmails.read_killmails.v1", Distanced(0)),
            ("esi-location.read_location.v1", Distanced(0)),
            ("esi-location.read_online.v1", Distanced(0)),
            ("esi-mail.organize_mail.v1", Distanced(1)),
            ("esi-mail.read_mail.v1", Distanced(0)),
            ("esi-mail.send_mail.v1", Distanced(1)),
            ("esi-markets.read_character_orders.v1", Distanced(0)),
            ("esi-planets.manage_planets.v1", Distanced(1)),
            ("esi-skills.read_skillqueue.v1", Distanced(0)),
            ("esi-skills.read_skills.v1", Distanced(0)),
            ("esi-ui.open_window.v1", Distanced(1)),
            ("esi-ui.write_waypoint.v1", Distanced(1)),
            ("esi-universe.read_structures.v1", Distanced(0)),
            ("esi-wallet.read_character_wallet.v1", Distanced(0)),
            ("esi-wallet.read_corporation_wallets.v1", Distanced(0)),
            ("publicData", Distanced(0)),
        ];
        for (name, policy) in capabilities {
            self.policies.insert((*name).to_string(), *policy);
        }

        self
    }

    /// Finalize the registry
    pub fn build(self) -> ScopeRegistry {
        ScopeRegistry {
            policies: self.policies,
        }
    }
}
