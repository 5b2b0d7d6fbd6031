//! Signed external token envelope
//!
//! The external representation of a token is `base64url(claims).base64url(tag)`
//! where `claims` is a compact JSON object and `tag` is the signer's MAC over
//! the exact claims bytes. Every field is bound into the signature; altering
//! any byte of the payload fails verification.
//!
//! Verification failures carry their precise cause in [`EnvelopeError`] for
//! logging; callers collapse them into one opaque credential failure before
//! anything leaves the process.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Token, TokenKind};
use crate::sign::Signer;

/// Envelope verification failures. Logged, never surfaced externally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Not two base64url parts separated by a dot
    #[error("malformed envelope")]
    Malformed,

    /// Signature does not match the payload
    #[error("signature mismatch")]
    BadSignature,

    /// Payload is not a valid claims object
    #[error("undecodable claims")]
    BadClaims,

    /// Issuer does not match this broker
    #[error("wrong issuer '{0}'")]
    WrongIssuer(String),

    /// `nbf` is in the future
    #[error("token not yet valid")]
    NotYetValid,

    /// `exp` has passed
    #[error("token expired")]
    Expired,
}

/// Claims bound into the signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued-at, seconds since epoch
    pub iat: i64,

    /// Issuer identity
    pub iss: String,

    /// Token id
    pub jti: Uuid,

    /// Not-before, seconds since epoch
    pub nbf: i64,

    /// Owner's external character id
    pub own: i64,

    /// Token kind
    pub typ: TokenKind,

    /// Expiry, seconds since epoch, absent for non-expiring tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Build claims for a token under the given issuer
    pub fn for_token(token: &Token, issuer: &str) -> Self {
        Self {
            iat: token.created_on.timestamp(),
            iss: issuer.to_string(),
            jti: token.id,
            nbf: token.created_on.timestamp(),
            own: token.owner.0,
            typ: token.kind,
            exp: token.expires_on.map(|expires_on| expires_on.timestamp()),
        }
    }

    /// Expiry as a timestamp, if present
    pub fn expires_on(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

/// Encode and sign claims into the external string form
pub fn encode(claims: &Claims, signer: &dyn Signer) -> serde_json::Result<String> {
    let payload = serde_json::to_vec(claims)?;
    let tag = signer.sign(&payload);

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(&tag),
    ))
}

/// Verify an external string and return its claims.
///
/// Checks, in order: envelope shape, signature, claims decoding, issuer,
/// not-before, expiry. The signature is checked before the payload is parsed
/// so unauthenticated bytes never reach the JSON decoder.
pub fn decode(
    envelope: &str,
    signer: &dyn Signer,
    issuer: &str,
    now: DateTime<Utc>,
) -> Result<Claims, EnvelopeError> {
    let (payload_b64, tag_b64) = envelope.split_once('.').ok_or(EnvelopeError::Malformed)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| EnvelopeError::Malformed)?;
    let tag = URL_SAFE_NO_PAD
        .decode(tag_b64)
        .map_err(|_| EnvelopeError::Malformed)?;

    if !signer.verify(&payload, &tag) {
        return Err(EnvelopeError::BadSignature);
    }

    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| EnvelopeError::BadClaims)?;

    if claims.iss != issuer {
        return Err(EnvelopeError::WrongIssuer(claims.iss));
    }
    if claims.nbf > now.timestamp() {
        return Err(EnvelopeError::NotYetValid);
    }
    if let Some(exp) = claims.exp {
        if exp <= now.timestamp() {
            return Err(EnvelopeError::Expired);
        }
    }

    Ok(claims)
}
