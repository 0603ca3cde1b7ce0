//! The token authentication gate.
//!
//! Resolves a candidate credential from one of two carriers (authorization
//! header, session cookie), verifies it against the process signing secret,
//! and yields an authenticated [`Principal`] or a rejection. The gate never
//! touches the attempt store and never logs request bodies.

pub mod carrier;
pub mod token;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::CarrierPrecedence;

pub use carrier::CarrierSet;
pub use token::{Claims, Principal};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No credential in any carrier")]
    MissingCredential,
    #[error("Invalid or expired credential")]
    InvalidCredential,
}

/// Authenticate a request from its credential carriers.
///
/// Extraction searches the carriers in the configured order; verification is
/// a pure check against `secret` and `now`, with no I/O. On rejection the
/// caller must respond and must not invoke any attempt operation.
pub fn authenticate(
    carriers: &CarrierSet,
    precedence: CarrierPrecedence,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let credential = carriers
        .extract(precedence)
        .ok_or(AuthError::MissingCredential)?;
    token::verify_at(secret, credential, now)
}
