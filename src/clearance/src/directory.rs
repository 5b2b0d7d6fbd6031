//! Organization graph read interface
//!
//! The hierarchy records are synchronized from the external game API by a job
//! outside this crate; the engine only needs read access plus one write-back
//! point for persisted clearance resets. Injecting the directory as a trait
//! keeps the engine unit-testable without a real store.

use crate::error::{ClearanceError, Result};
use async_trait::async_trait;
use helio_core::{
    Alliance, AllianceId, CharacterId, Coalition, CoalitionId, Corporation, CorporationId, User,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read access to the User/Corporation/Alliance/Coalition hierarchy
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Fetch a user by character id
    async fn user(&self, id: CharacterId) -> Result<Option<User>>;

    /// Fetch a corporation by id
    async fn corporation(&self, id: CorporationId) -> Result<Option<Corporation>>;

    /// Fetch an alliance by id
    async fn alliance(&self, id: AllianceId) -> Result<Option<Alliance>>;

    /// Coalitions the given alliance is a member of
    async fn coalitions_of(&self, alliance: AllianceId) -> Result<Vec<Coalition>>;

    /// Write back a user's clearance level. Used by persisted clearance
    /// resets; everything else in this trait is read-only.
    async fn update_clearance(&self, id: CharacterId, level: u8) -> Result<()>;
}

/// In-memory directory implementation
///
/// Backs unit tests and small single-process deployments; production
/// deployments implement [`OrgDirectory`] over their own store.
pub struct InMemoryDirectory {
    users: RwLock<HashMap<CharacterId, User>>,
    corporations: RwLock<HashMap<CorporationId, Corporation>>,
    alliances: RwLock<HashMap<AllianceId, Alliance>>,
    coalitions: RwLock<HashMap<CoalitionId, Coalition>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            corporations: RwLock::new(HashMap::new()),
            alliances: RwLock::new(HashMap::new()),
            coalitions: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a user record
    pub async fn put_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Insert or replace a corporation record
    pub async fn put_corporation(&self, corporation: Corporation) {
        self.corporations
            .write()
            .await
            .insert(corporation.id, corporation);
    }

    /// Insert or replace an alliance record
    pub async fn put_alliance(&self, alliance: Alliance) {
        self.alliances.write().await.insert(alliance.id, alliance);
    }

    /// Insert or replace a coalition record
    pub async fn put_coalition(&self, coalition: Coalition) {
        self.coalitions.write().await.insert(coalition.id, coalition);
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrgDirectory for InMemoryDirectory {
    async fn user(&self, id: CharacterId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn corporation(&self, id: CorporationId) -> Result<Option<Corporation>> {
        Ok(self.corporations.read().await.get(&id).cloned())
    }

    async fn alliance(&self, id: AllianceId) -> Result<Option<Alliance>> {
        Ok(self.alliances.read().await.get(&id).cloned())
    }

    async fn coalitions_of(&self, alliance: AllianceId) -> Result<Vec<Coalition>> {
        let coalitions = self.coalitions.read().await;
        Ok(coalitions
            .values()
            .filter(|c| c.contains(alliance))
            .cloned()
            .collect())
    }

    async fn update_clearance(&self, id: CharacterId, level: u8) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| ClearanceError::NotFound(format!("user {}", id)))?;
        user.set_clearance(level);
        Ok(())
    }
}
