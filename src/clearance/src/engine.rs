//! Clearance evaluation engine
//!
//! Answers "can subject S perform scope P against target T" as a pure query
//! over the organization graph plus the decision-cache side channel. The
//! engine performs no writes to user or organization records except the
//! explicit write-back in [`ClearanceEngine::reset_clearance`].

use crate::cache::{CacheConfig, CacheStats, DecisionCache};
use crate::directory::OrgDirectory;
use crate::error::{ClearanceError, Result};
use crate::policy::Policy;
use crate::registry::ScopeRegistry;
use helio_core::{AllianceId, User, MAX_CLEARANCE};
use std::sync::Arc;
use tracing::{debug, warn};

/// Clearance level at which distance penalties stop applying
const DISTANCE_EXEMPT_LEVEL: u8 = 7;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Enable the decision cache. Disabled, every call recomputes from the
    /// organization graph; the answers must be identical either way.
    pub enable_cache: bool,

    /// Cache configuration
    pub cache_config: CacheConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_config: CacheConfig::default(),
        }
    }
}

/// The clearance engine
///
/// # Architecture
///
/// ```text
/// has_clearance(subject, scope, target)
///       │
///       ├── ScopeRegistry ── unknown scope → deny (logged)
///       ├── DecisionCache ── hit → cached boolean
///       └── Policy dispatch ─ Absolute | Distanced | ClearanceEdit
///                │
///            OrgDirectory (corporation / alliance / coalition lookups)
/// ```
pub struct ClearanceEngine {
    /// Organization graph read interface
    directory: Arc<dyn OrgDirectory>,

    /// Scope-to-policy mapping
    registry: Arc<ScopeRegistry>,

    /// Decision cache, absent when disabled
    cache: Option<DecisionCache>,
}

impl ClearanceEngine {
    /// Create a new engine
    pub fn new(
        config: EngineConfig,
        directory: Arc<dyn OrgDirectory>,
        registry: Arc<ScopeRegistry>,
    ) -> Self {
        let cache = config
            .enable_cache
            .then(|| DecisionCache::new(config.cache_config.clone()));

        Self {
            directory,
            registry,
            cache,
        }
    }

    /// Check whether `subject` holds sufficient clearance to perform `scope`
    /// against `target`.
    ///
    /// Never fails for policy reasons: unknown scopes and malformed
    /// target/policy combinations evaluate to `false` (logged), and an
    /// `Absolute` scope given a spurious target ignores it. `Err` is reserved
    /// for organization-store failures.
    pub async fn has_clearance(
        &self,
        subject: &User,
        scope: &str,
        target: Option<&User>,
    ) -> Result<bool> {
        let Some(policy) = self.registry.get(scope) else {
            warn!(scope, "Unknown scope, denying");
            return Ok(false);
        };

        let target_id = target.map(|t| t.id);
        if let Some(cache) = &self.cache {
            if let Some(allowed) = cache.get(subject.id, scope, target_id) {
                return Ok(allowed);
            }
        }

        let allowed = self.evaluate(subject, scope, policy, target).await?;

        if let Some(cache) = &self.cache {
            cache.put(subject.id, scope, target_id, allowed);
        }

        Ok(allowed)
    }

    /// Like [`ClearanceEngine::has_clearance`] but fails fast with
    /// [`ClearanceError::PermissionDenied`] when the answer is `false`.
    pub async fn assert_has_clearance(
        &self,
        subject: &User,
        scope: &str,
        target: Option<&User>,
    ) -> Result<()> {
        if self.has_clearance(subject, scope, target).await? {
            Ok(())
        } else {
            Err(ClearanceError::PermissionDenied {
                subject: subject.id,
                scope: scope.to_string(),
            })
        }
    }

    /// Organizational distance between two users:
    ///
    /// - 0 for the same user
    /// - 1 for distinct users in the same corporation
    /// - 3 for the same alliance but not the same corporation
    /// - 5 for the same coalition but not the same alliance
    /// - 7 otherwise
    ///
    /// "Same X" requires both sides to actually have an X: a user with no
    /// corporation is in nobody's corporation, including another
    /// corporation-less user's.
    pub async fn distance_penalty(&self, subject: &User, target: &User) -> Result<u8> {
        if subject.id == target.id {
            return Ok(0);
        }

        match (subject.corporation_id, target.corporation_id) {
            (Some(a), Some(b)) if a == b => return Ok(1),
            (Some(a), Some(b)) => {
                let alliance_a = self.alliance_of_corporation(a).await?;
                let alliance_b = self.alliance_of_corporation(b).await?;

                match (alliance_a, alliance_b) {
                    (Some(a), Some(b)) if a == b => return Ok(3),
                    (Some(a), Some(b)) => {
                        if self.share_coalition(a, b).await? {
                            return Ok(5);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        Ok(7)
    }

    /// Recompute a user's clearance from organizational facts:
    ///
    /// - the root identity and level-10 users stay at 10
    /// - CEOs of alliance-executor corporations get 4
    /// - corporation CEOs get 2
    /// - everyone else resets to 0
    ///
    /// Invoked when corporation or alliance membership changes; it levels
    /// privilege and never silently raises it beyond these rules. With
    /// `persist` the new level is written through the directory.
    pub async fn reset_clearance(&self, user: &mut User, persist: bool) -> Result<u8> {
        let level = if user.is_root() || user.clearance_level() == MAX_CLEARANCE {
            MAX_CLEARANCE
        } else {
            self.organizational_clearance(user).await?
        };

        debug!(user = %user.id, level, "Clearance reset");
        user.set_clearance(level);

        if persist {
            self.directory.update_clearance(user.id, level).await?;
        }

        Ok(level)
    }

    /// Drop all cached decisions
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Cache statistics, if the cache is enabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    // Private helpers

    /// Dispatch to the policy variant's rule. One arm per variant; the match
    /// is exhaustive so a new variant cannot be forgotten here.
    async fn evaluate(
        &self,
        subject: &User,
        scope: &str,
        policy: Policy,
        target: Option<&User>,
    ) -> Result<bool> {
        let allowed = match policy {
            Policy::Absolute(level) => {
                if target.is_some() {
                    // Caller error; absolute policies ignore the target
                    // entirely, so it must not flip the result.
                    warn!(scope, "Target supplied for an absolute scope, ignoring");
                }
                subject.clearance_level() >= level
            }

            Policy::Distanced(level) => {
                let Some(target) = target else {
                    warn!(scope, "Distanced scope checked without a target, denying");
                    return Ok(false);
                };
                if subject.clearance_level() >= DISTANCE_EXEMPT_LEVEL {
                    true
                } else {
                    let penalty = self.distance_penalty(subject, target).await?;
                    subject.clearance_level() >= level.saturating_add(penalty)
                }
            }

            Policy::ClearanceEdit(level) => {
                let Some(target) = target else {
                    warn!(scope, "Clearance-edit scope checked without a target, denying");
                    return Ok(false);
                };
                if subject.id == target.id {
                    // Nobody edits their own clearance, whatever their level.
                    false
                } else {
                    let penalty = self.distance_penalty(subject, target).await?;
                    let required = (penalty + 1).max(level).max(target.clearance_level());
                    subject.clearance_level() >= required
                }
            }
        };

        debug!(
            subject = %subject.id,
            scope,
            target = target.map(|t| t.id.0),
            clearance = subject.clearance_level(),
            allowed,
            "Clearance decision"
        );

        Ok(allowed)
    }

    /// Clearance level derived purely from organizational leadership
    async fn organizational_clearance(&self, user: &User) -> Result<u8> {
        let Some(corporation_id) = user.corporation_id else {
            return Ok(0);
        };
        let Some(corporation) = self.directory.corporation(corporation_id).await? else {
            return Ok(0);
        };
        if corporation.ceo_id != user.id {
            return Ok(0);
        }

        // Corporation CEO; 4 if the corporation executes its alliance.
        if let Some(alliance_id) = corporation.alliance_id {
            if let Some(alliance) = self.directory.alliance(alliance_id).await? {
                if alliance.executor_corporation_id == corporation.id {
                    return Ok(4);
                }
            }
        }

        Ok(2)
    }

    async fn alliance_of_corporation(
        &self,
        id: helio_core::CorporationId,
    ) -> Result<Option<AllianceId>> {
        Ok(self
            .directory
            .corporation(id)
            .await?
            .and_then(|corporation| corporation.alliance_id))
    }

    async fn share_coalition(&self, a: AllianceId, b: AllianceId) -> Result<bool> {
        let coalitions = self.directory.coalitions_of(a).await?;
        Ok(coalitions.iter().any(|coalition| coalition.contains(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::registry::scopes;
    use helio_core::{CharacterId, Corporation, CorporationId};

    fn engine_with(directory: Arc<InMemoryDirectory>) -> ClearanceEngine {
        ClearanceEngine::new(
            EngineConfig::default(),
            directory,
            Arc::new(ScopeRegistry::builtin()),
        )
    }

    #[tokio::test]
    async fn test_unknown_scope_denies() {
        let engine = engine_with(Arc::new(InMemoryDirectory::new()));
        let root = User::new(CharacterId::ROOT, "root", 10, None);

        assert!(!engine.has_clearance(&root, "no.such_scope", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_absolute_ignores_spurious_target() {
        let engine = engine_with(Arc::new(InMemoryDirectory::new()));
        let admin = User::new(CharacterId(1), "admin", 9, None);
        let other = User::new(CharacterId(2), "other", 0, None);

        // Same result with and without the bogus target
        assert!(engine
            .has_clearance(&admin, scopes::WRITE_GROUP, Some(&other))
            .await
            .unwrap());
        assert!(engine.has_clearance(&admin, scopes::WRITE_GROUP, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_distanced_requires_target() {
        let engine = engine_with(Arc::new(InMemoryDirectory::new()));
        let user = User::new(CharacterId(1), "pilot", 10, None);

        assert!(!engine
            .has_clearance(&user, "esi-mail.read_mail.v1", None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_clearance_edit_never_self() {
        let engine = engine_with(Arc::new(InMemoryDirectory::new()));
        let user = User::new(CharacterId(1), "pilot", 10, None);

        for level in 0..=10u8 {
            let scope = scopes::set_clearance_level(level);
            assert!(!engine.has_clearance(&user, &scope, Some(&user)).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_assert_has_clearance_errors() {
        let engine = engine_with(Arc::new(InMemoryDirectory::new()));
        let nobody = User::new(CharacterId(1), "nobody", 0, None);

        let err = engine
            .assert_has_clearance(&nobody, scopes::WRITE_GROUP, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClearanceError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_reset_clearance_corporation_ceo() {
        let directory = Arc::new(InMemoryDirectory::new());
        directory
            .put_corporation(Corporation {
                id: CorporationId(100),
                name: "Dust Runners".to_string(),
                ticker: "DUST".to_string(),
                ceo_id: CharacterId(1),
                alliance_id: None,
            })
            .await;

        let engine = engine_with(directory);

        let mut ceo = User::new(CharacterId(1), "ceo", 0, Some(CorporationId(100)));
        assert_eq!(engine.reset_clearance(&mut ceo, false).await.unwrap(), 2);
        assert_eq!(ceo.clearance_level(), 2);

        let mut member = User::new(CharacterId(2), "member", 5, Some(CorporationId(100)));
        assert_eq!(engine.reset_clearance(&mut member, false).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reset_clearance_root_pinned() {
        let engine = engine_with(Arc::new(InMemoryDirectory::new()));

        let mut root = User::new(CharacterId::ROOT, "root", 10, None);
        assert_eq!(engine.reset_clearance(&mut root, false).await.unwrap(), 10);

        let mut admin = User::new(CharacterId(9), "admin", 10, None);
        assert_eq!(engine.reset_clearance(&mut admin, false).await.unwrap(), 10);
    }
}
