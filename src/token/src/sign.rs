//! Signing primitive
//!
//! The external token representation is signed with a shared secret. The
//! boundary is a trait so tests can substitute a fake signer and deployments
//! can swap the algorithm without touching the envelope code.

use ring::hmac;

/// Signs and verifies envelope payloads
pub trait Signer: Send + Sync {
    /// Compute the signature over a payload
    fn sign(&self, payload: &[u8]) -> Vec<u8>;

    /// Verify a signature over a payload. Must be constant-time with respect
    /// to the signature bytes.
    fn verify(&self, payload: &[u8], signature: &[u8]) -> bool;

    /// Algorithm tag, for logs
    fn algorithm(&self) -> &'static str;
}

/// HMAC-SHA256 signer over a configured shared secret
pub struct HmacSha256Signer {
    key: hmac::Key,
}

impl HmacSha256Signer {
    /// Create a signer from the shared secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }
}

impl Signer for HmacSha256Signer {
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        hmac::sign(&self.key, payload).as_ref().to_vec()
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> bool {
        hmac::verify(&self.key, payload, signature).is_ok()
    }

    fn algorithm(&self) -> &'static str {
        "HS256"
    }
}
