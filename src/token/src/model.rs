//! Token and state-code data model

use chrono::{DateTime, Utc};
use helio_core::CharacterId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token kinds.
///
/// Closed enumeration; derivation and revocation logic match exhaustively so
/// adding a kind is a compile-time-visible change everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// App-level token used to bootstrap user logins through the external
    /// login handshake
    #[serde(rename = "dyn")]
    Dynamic,

    /// App-level token allowed to mint user tokens directly, without an
    /// external login step
    #[serde(rename = "per")]
    Permanent,

    /// One authenticated end-user session, always derived from an app token
    #[serde(rename = "use")]
    User,
}

impl TokenKind {
    /// Wire tag carried in signed claims
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Dynamic => "dyn",
            TokenKind::Permanent => "per",
            TokenKind::User => "use",
        }
    }

    /// Whether this is an app-level kind (Dynamic or Permanent)
    pub fn is_app_kind(&self) -> bool {
        matches!(self, TokenKind::Dynamic | TokenKind::Permanent)
    }
}

/// A credential issued by the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique token identifier
    pub id: Uuid,

    /// Token kind
    pub kind: TokenKind,

    /// Owning character
    pub owner: CharacterId,

    /// Token this one was derived from. Always present on User tokens.
    pub parent: Option<Uuid>,

    /// Creation timestamp
    pub created_on: DateTime<Utc>,

    /// Expiry timestamp. `None` means the token never expires on its own.
    pub expires_on: Option<DateTime<Utc>>,

    /// Callback URL notified by the app ecosystem, if any
    pub callback: Option<String>,

    /// Free-text comment
    pub comment: Option<String>,
}

impl Token {
    /// Whether the token is expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_on.is_some_and(|expires_on| expires_on <= now)
    }
}

/// Ephemeral correlation record binding a pending external-login handshake
/// to the dynamic app token that initiated it. Consumed exactly once by
/// `complete_login`, or garbage-collected after its 10-minute TTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCode {
    /// Unique state code identifier, embedded in the external login URL as
    /// correlation state
    pub id: Uuid,

    /// Dynamic app token that requested the login
    pub app_token: Uuid,

    /// Creation timestamp
    pub created_on: DateTime<Utc>,
}

/// The end-user identity resolved from a completed external login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Authenticated character
    pub character_id: CharacterId,

    /// Character display name
    pub character_name: String,
}
