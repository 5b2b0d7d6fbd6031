//! # Helio Token Lifecycle
//!
//! Issues, derives, revokes, and externally represents broker credentials.
//!
//! ## State machine
//!
//! ```text
//! Dynamic   --start_login-->  StateCode  --complete_login-->  User (expires in 24h)
//! Permanent --derive_user_token_from_permanent------------->  User (never expires)
//! {Dynamic, Permanent} --revoke--> ∅   (cascades to all derived tokens)
//! StateCode --10 min timeout--> garbage collected
//! ```
//!
//! Issuance operations are gated by the clearance engine; external
//! representations are HMAC-signed envelopes verified on the way back in.

pub mod config;
pub mod envelope;
pub mod error;
pub mod model;
pub mod service;
pub mod sign;
pub mod store;

// Re-export commonly used types
pub use config::TokenConfig;
pub use envelope::Claims;
pub use error::{Result, TokenError};
pub use model::{ExternalIdentity, StateCode, Token, TokenKind};
pub use service::{IssueOptions, TokenService};
pub use sign::{HmacSha256Signer, Signer};
pub use store::{InMemoryTokenStore, TokenStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
