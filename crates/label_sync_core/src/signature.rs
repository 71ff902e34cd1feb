//! Webhook signature verification.
//!
//! GitHub signs each delivery with HMAC-SHA1 over the raw request body and
//! sends the result as `sha1=<40 lowercase hex digits>` in `X-Hub-Signature`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use tracing::warn;

use crate::{SyncError, SyncResult};

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;

type HmacSha1 = Hmac<Sha1>;

/// Prefix GitHub puts in front of the hex digest
pub const SIGNATURE_PREFIX: &str = "sha1=";

/// Length of a hex encoded SHA-1 digest
const DIGEST_HEX_LENGTH: usize = 40;

fn is_lower_hex(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f')
}

fn mac_for(secret: &[u8]) -> HmacSha1 {
    HmacSha1::new_from_slice(secret).expect("HMAC accepts any key length")
}

/// Computes the signature GitHub would send for `body`.
pub fn compute_signature(secret: &[u8], body: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(body);
    format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Returns true if `presented` is the signature of `body` under `secret`.
///
/// Only the exact form GitHub sends is accepted: `sha1=` followed by 40
/// lowercase hex digits. The digest comparison is constant time.
#[must_use]
pub fn is_valid_signature(secret: &[u8], body: &[u8], presented: &str) -> bool {
    let Some(digest) = presented.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    if digest.len() != DIGEST_HEX_LENGTH || !digest.bytes().all(is_lower_hex) {
        return false;
    }
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };

    let mut mac = mac_for(secret);
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Checks deliveries against the shared webhook secret.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature header of a delivery.
    ///
    /// A missing header is treated the same as a wrong one.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidSignature` when the header is absent or does
    /// not match the body.
    pub fn verify(&self, body: &[u8], presented: Option<&str>) -> SyncResult<()> {
        let Some(presented) = presented else {
            warn!("Delivery has no signature header");
            return Err(SyncError::InvalidSignature);
        };

        if is_valid_signature(self.secret.expose_secret().as_bytes(), body, presented) {
            Ok(())
        } else {
            warn!("Delivery signature does not match the body");
            Err(SyncError::InvalidSignature)
        }
    }
}
