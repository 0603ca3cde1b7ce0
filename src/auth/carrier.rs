//! Credential carriers and the ordered extraction policy.

use crate::config::CarrierPrecedence;

/// Literal prefix an authorization header must carry.
const BEARER_PREFIX: &str = "Bearer ";

/// The two transport locations a credential may be read from.
///
/// Values are raw: the authorization value still carries its `Bearer ` prefix,
/// the cookie value is the stored credential itself.
#[derive(Debug, Clone, Default)]
pub struct CarrierSet {
    /// Raw value of the authorization header, if present
    pub authorization: Option<String>,
    /// Value of the session cookie, if present
    pub cookie: Option<String>,
}

impl CarrierSet {
    /// Search the carriers in the configured order and return the first
    /// non-empty credential.
    ///
    /// The search is deterministic: precedence is fixed process-wide, and a
    /// carrier that is present but empty (or lacks the `Bearer ` prefix)
    /// falls through to the next one.
    pub fn extract(&self, precedence: CarrierPrecedence) -> Option<&str> {
        match precedence {
            CarrierPrecedence::HeaderFirst => self.bearer().or_else(|| self.session_cookie()),
            CarrierPrecedence::CookieFirst => self.session_cookie().or_else(|| self.bearer()),
        }
    }

    fn bearer(&self) -> Option<&str> {
        self.authorization
            .as_deref()
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .filter(|t| !t.is_empty())
    }

    fn session_cookie(&self) -> Option<&str> {
        self.cookie.as_deref().filter(|v| !v.is_empty())
    }
}
