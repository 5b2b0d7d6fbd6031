//! Token and state-code storage
//!
//! The store owns identifier uniqueness and cascade-delete atomicity: a
//! concurrent read must never observe a token whose parent is already gone.
//! The in-memory implementation holds one write lock across the whole
//! cascade; database-backed implementations use a transaction.

use crate::error::{Result, TokenError};
use crate::model::{StateCode, Token, TokenKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use helio_core::CharacterId;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence interface for tokens and state codes
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a new token. Fails if the id already exists or if a User
    /// token arrives without a parent.
    async fn insert_token(&self, token: Token) -> Result<()>;

    /// Fetch a token by id
    async fn token(&self, id: Uuid) -> Result<Option<Token>>;

    /// All tokens owned by a character
    async fn tokens_of_owner(&self, owner: CharacterId) -> Result<Vec<Token>>;

    /// Delete a token and, transitively, every token derived from it.
    /// Returns the number of tokens removed; `NotFound` if the root is
    /// absent. Atomic with respect to concurrent reads.
    async fn delete_token_cascade(&self, id: Uuid) -> Result<usize>;

    /// Persist a new state code. Fails if the id already exists.
    async fn insert_state_code(&self, state_code: StateCode) -> Result<()>;

    /// Remove and return a state code. A second call with the same id
    /// returns `None`; this is the exactly-once consumption point.
    async fn take_state_code(&self, id: Uuid) -> Result<Option<StateCode>>;

    /// Drop state codes created at or before `cutoff`. Returns how many were
    /// removed.
    async fn purge_state_codes_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

/// In-memory token store
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<Uuid, Token>>,
    state_codes: RwLock<HashMap<Uuid, StateCode>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            state_codes: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert_token(&self, token: Token) -> Result<()> {
        if token.kind == TokenKind::User && token.parent.is_none() {
            return Err(TokenError::Store(
                "user tokens require a parent token".to_string(),
            ));
        }

        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.id) {
            return Err(TokenError::Store(format!("duplicate token id {}", token.id)));
        }
        tokens.insert(token.id, token);
        Ok(())
    }

    async fn token(&self, id: Uuid) -> Result<Option<Token>> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn tokens_of_owner(&self, owner: CharacterId) -> Result<Vec<Token>> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|token| token.owner == owner)
            .cloned()
            .collect())
    }

    async fn delete_token_cascade(&self, id: Uuid) -> Result<usize> {
        // One write lock across the whole cascade, so no reader can see a
        // child outliving its parent.
        let mut tokens = self.tokens.write().await;
        if !tokens.contains_key(&id) {
            return Err(TokenError::NotFound(format!("token {}", id)));
        }

        let mut doomed = vec![id];
        let mut index = 0;
        while index < doomed.len() {
            let parent = doomed[index];
            doomed.extend(
                tokens
                    .values()
                    .filter(|token| token.parent == Some(parent))
                    .map(|token| token.id),
            );
            index += 1;
        }

        for id in &doomed {
            tokens.remove(id);
        }
        Ok(doomed.len())
    }

    async fn insert_state_code(&self, state_code: StateCode) -> Result<()> {
        let mut state_codes = self.state_codes.write().await;
        if state_codes.contains_key(&state_code.id) {
            return Err(TokenError::Store(format!(
                "duplicate state code id {}",
                state_code.id
            )));
        }
        state_codes.insert(state_code.id, state_code);
        Ok(())
    }

    async fn take_state_code(&self, id: Uuid) -> Result<Option<StateCode>> {
        Ok(self.state_codes.write().await.remove(&id))
    }

    async fn purge_state_codes_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut state_codes = self.state_codes.write().await;
        let before = state_codes.len();
        state_codes.retain(|_, state_code| state_code.created_on > cutoff);
        Ok(before - state_codes.len())
    }
}
