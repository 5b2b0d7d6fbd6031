//! Token lifecycle operations
//!
//! `TokenService` is the single entry point the HTTP layer calls: issuance of
//! app tokens, the external-login handshake, direct user-token derivation,
//! revocation with cascade, and the signed external representation.

use crate::config::TokenConfig;
use crate::envelope::{self, Claims};
use crate::error::{Result, TokenError};
use crate::model::{ExternalIdentity, StateCode, Token, TokenKind};
use crate::sign::Signer;
use crate::store::TokenStore;
use helio_clearance::{scopes, ClearanceEngine};
use helio_core::{time, CharacterId, User};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Optional fields on app-token issuance
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    /// Callback URL notified by the app ecosystem
    pub callback: Option<String>,

    /// Free-text comment
    pub comment: Option<String>,

    /// Token this one is derived from
    pub parent: Option<Uuid>,
}

/// The token lifecycle service
pub struct TokenService {
    store: Arc<dyn TokenStore>,
    clearance: Arc<ClearanceEngine>,
    signer: Arc<dyn Signer>,
    config: TokenConfig,
}

impl TokenService {
    /// Create a new token service
    pub fn new(
        config: TokenConfig,
        store: Arc<dyn TokenStore>,
        clearance: Arc<ClearanceEngine>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self {
            store,
            clearance,
            signer,
            config,
        }
    }

    /// Issue a dynamic app token for `owner`.
    ///
    /// Requires the `helio.write_dyn_token` scope. Dynamic tokens never
    /// expire on their own; they go away by revocation or owner deletion.
    pub async fn issue_dynamic_token(&self, owner: &User, options: IssueOptions) -> Result<Token> {
        self.clearance
            .assert_has_clearance(owner, scopes::WRITE_DYN_TOKEN, None)
            .await?;
        self.mint_app_token(TokenKind::Dynamic, owner, options).await
    }

    /// Issue a permanent app token for `owner`.
    ///
    /// Requires the `helio.write_per_token` scope.
    pub async fn issue_permanent_token(&self, owner: &User, options: IssueOptions) -> Result<Token> {
        self.clearance
            .assert_has_clearance(owner, scopes::WRITE_PER_TOKEN, None)
            .await?;
        self.mint_app_token(TokenKind::Permanent, owner, options).await
    }

    /// Begin the external login handshake for a dynamic app token.
    ///
    /// The returned state code's id is embedded by the caller in the external
    /// login URL as correlation state. The code lives for ten minutes.
    pub async fn start_login(&self, app_token: &Token) -> Result<StateCode> {
        if app_token.kind != TokenKind::Dynamic {
            warn!(token = %app_token.id, kind = app_token.kind.as_str(),
                "Login handshake requested with a non-dynamic token");
            return Err(TokenError::PermissionDenied(
                "login handshakes require a dynamic app token".to_string(),
            ));
        }

        let state_code = StateCode {
            id: Uuid::new_v4(),
            app_token: app_token.id,
            created_on: time::now(),
        };
        self.store.insert_state_code(state_code.clone()).await?;

        info!(state_code = %state_code.id, app_token = %app_token.id, "Created state code");
        Ok(state_code)
    }

    /// Complete the external login handshake.
    ///
    /// Consumes the state code exactly once: a second call with the same id
    /// fails with `NotFound`, as does a code past its TTL. The derived user
    /// token belongs to the authenticated end-user identity, not to the app,
    /// and expires 24 hours out when the parent is dynamic.
    pub async fn complete_login(
        &self,
        state_code_id: Uuid,
        identity: &ExternalIdentity,
    ) -> Result<Token> {
        let state_code = self
            .store
            .take_state_code(state_code_id)
            .await?
            .ok_or_else(|| TokenError::NotFound(format!("state code {}", state_code_id)))?;

        let now = time::now();
        if state_code.created_on + self.config.state_code_ttl() <= now {
            // Past its TTL the code is as good as garbage-collected.
            debug!(state_code = %state_code_id, "State code expired before completion");
            return Err(TokenError::NotFound(format!("state code {}", state_code_id)));
        }

        let parent = self
            .store
            .token(state_code.app_token)
            .await?
            .ok_or_else(|| TokenError::NotFound(format!("token {}", state_code.app_token)))?;

        let token = self.derive_user_token(&parent, identity.character_id).await?;
        info!(token = %token.id, owner = %identity.character_id, parent = %parent.id,
            "Completed login");
        Ok(token)
    }

    /// Mint a user token directly from a permanent app token, bypassing the
    /// external login. Used for trusted server-to-server flows; the result
    /// never expires, same as any permanent-rooted user token.
    pub async fn derive_user_token_from_permanent(
        &self,
        permanent_token: &Token,
        owner: CharacterId,
    ) -> Result<Token> {
        if permanent_token.kind != TokenKind::Permanent {
            warn!(token = %permanent_token.id, kind = permanent_token.kind.as_str(),
                "Direct user-token derivation requested with a non-permanent token");
            return Err(TokenError::PermissionDenied(
                "direct derivation requires a permanent app token".to_string(),
            ));
        }

        let token = self.derive_user_token(permanent_token, owner).await?;
        info!(token = %token.id, owner = %owner, parent = %permanent_token.id,
            "Derived user token from permanent token");
        Ok(token)
    }

    /// Revoke a token and every token transitively derived from it.
    ///
    /// The caller must hold the write scope matching the kind of the token
    /// being revoked. Returns the number of tokens removed.
    pub async fn revoke(&self, token_id: Uuid, caller: &User) -> Result<usize> {
        let token = self
            .store
            .token(token_id)
            .await?
            .ok_or_else(|| TokenError::NotFound(format!("token {}", token_id)))?;

        let scope = match token.kind {
            TokenKind::Dynamic => scopes::WRITE_DYN_TOKEN,
            TokenKind::Permanent => scopes::WRITE_PER_TOKEN,
            TokenKind::User => scopes::WRITE_USE_TOKEN,
        };
        self.clearance.assert_has_clearance(caller, scope, None).await?;

        let removed = self.store.delete_token_cascade(token_id).await?;
        info!(token = %token_id, removed, caller = %caller.id, "Revoked token");
        Ok(removed)
    }

    /// List the caller's own tokens. Requires `helio.read_own_token`.
    pub async fn list_own_tokens(&self, caller: &User) -> Result<Vec<Token>> {
        self.clearance
            .assert_has_clearance(caller, scopes::READ_OWN_TOKEN, None)
            .await?;
        self.store.tokens_of_owner(caller.id).await
    }

    /// Produce the signed external string for a token
    pub fn to_external_representation(&self, token: &Token) -> Result<String> {
        let claims = Claims::for_token(token, &self.config.issuer);
        Ok(envelope::encode(&claims, self.signer.as_ref())?)
    }

    /// Verify an external string and resolve it back to the live token.
    ///
    /// A valid signature does not imply the token still exists; revoked
    /// tokens fail here like any other bad credential. Every failure surfaces
    /// as the opaque `InvalidCredential`, with the cause only in the logs.
    pub async fn from_external_representation(&self, external: &str) -> Result<Token> {
        let now = time::now();
        let claims = envelope::decode(external, self.signer.as_ref(), &self.config.issuer, now)
            .map_err(|err| {
                warn!(error = %err, algorithm = self.signer.algorithm(),
                    "External token failed verification");
                TokenError::InvalidCredential
            })?;

        let Some(token) = self.store.token(claims.jti).await? else {
            warn!(token = %claims.jti, "Externally valid token no longer exists");
            return Err(TokenError::InvalidCredential);
        };
        if token.is_expired(now) {
            warn!(token = %token.id, "External token refers to an expired token");
            return Err(TokenError::InvalidCredential);
        }

        debug!(token = %token.id, "Validated external token");
        Ok(token)
    }

    /// Drop state codes past their TTL. Invoked by the caller's scheduler;
    /// abandoned handshakes disappear silently rather than failing loudly.
    pub async fn purge_expired_state_codes(&self) -> Result<usize> {
        let cutoff = time::now() - self.config.state_code_ttl();
        let purged = self.store.purge_state_codes_before(cutoff).await?;
        if purged > 0 {
            debug!(purged, "Purged expired state codes");
        }
        Ok(purged)
    }

    // Private helpers

    async fn mint_app_token(
        &self,
        kind: TokenKind,
        owner: &User,
        options: IssueOptions,
    ) -> Result<Token> {
        let token = Token {
            id: Uuid::new_v4(),
            kind,
            owner: owner.id,
            parent: options.parent,
            created_on: time::now(),
            expires_on: None,
            callback: options.callback,
            comment: options.comment,
        };
        self.store.insert_token(token.clone()).await?;

        info!(token = %token.id, kind = kind.as_str(), owner = %owner.id, "Created app token");
        Ok(token)
    }

    /// Derivation rule: dynamic parents yield expiring user tokens,
    /// permanent parents yield non-expiring ones. User tokens cannot parent
    /// further tokens.
    async fn derive_user_token(&self, parent: &Token, owner: CharacterId) -> Result<Token> {
        let now = time::now();
        let expires_on = match parent.kind {
            TokenKind::Dynamic => Some(now + self.config.user_token_ttl()),
            TokenKind::Permanent => None,
            TokenKind::User => {
                warn!(token = %parent.id, "User token cannot parent a derivation");
                return Err(TokenError::PermissionDenied(
                    "user tokens cannot derive further tokens".to_string(),
                ));
            }
        };

        let token = Token {
            id: Uuid::new_v4(),
            kind: TokenKind::User,
            owner,
            parent: Some(parent.id),
            created_on: now,
            expires_on,
            callback: None,
            comment: None,
        };
        self.store.insert_token(token.clone()).await?;
        Ok(token)
    }
}
