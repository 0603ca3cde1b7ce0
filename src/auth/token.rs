//! Signed credential minting and verification.
//!
//! Tokens are `base64url(claims JSON).base64url(HMAC-SHA256 tag)`. The tag
//! covers the encoded claims, keyed by the process signing secret.
//! Verification depends only on the secret, the credential bytes, and the
//! supplied clock instant, so it is deterministic under a fixed time and
//! secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Claims embedded in a signed credential at issuance time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Subject: the identity the credential was issued for
    pub sub: i64,
    /// Additional claims, carried opaquely and never reinterpreted here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Claims for `sub`, issued at `now` and valid for `ttl_seconds`.
    pub fn new(sub: i64, now: DateTime<Utc>, ttl_seconds: u64) -> Self {
        Self {
            exp: now.timestamp() + ttl_seconds as i64,
            iat: now.timestamp(),
            sub,
            extra: Map::new(),
        }
    }
}

/// The authenticated identity derived from a verified credential.
/// Request-scoped; never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub claims: Claims,
}

/// Mint a signed credential for the given claims.
pub fn sign(secret: &[u8], claims: &Claims) -> String {
    let payload = serde_json::to_vec(claims).expect("claims serialize to JSON");
    let encoded = URL_SAFE_NO_PAD.encode(payload);

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(encoded.as_bytes());
    let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{encoded}.{tag}")
}

/// Verify a credential against the secret at the given instant.
///
/// Rejects with [`AuthError::InvalidCredential`] when the credential is
/// malformed, the tag does not match, or the expiry has passed.
pub fn verify_at(
    secret: &[u8],
    credential: &str,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let (encoded, tag) = credential
        .split_once('.')
        .ok_or(AuthError::InvalidCredential)?;

    let tag = URL_SAFE_NO_PAD
        .decode(tag)
        .map_err(|_| AuthError::InvalidCredential)?;

    // Constant-time comparison via the Mac verifier
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(encoded.as_bytes());
    mac.verify_slice(&tag)
        .map_err(|_| AuthError::InvalidCredential)?;

    let payload = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| AuthError::InvalidCredential)?;
    let claims: Claims =
        serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidCredential)?;

    if claims.exp <= now.timestamp() {
        return Err(AuthError::InvalidCredential);
    }

    Ok(Principal {
        id: claims.sub,
        claims,
    })
}
