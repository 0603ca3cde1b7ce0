//! Token authentication middleware
//!
//! The gate in front of every attempt route: builds the carrier set from the
//! request, verifies the credential, and injects the authenticated
//! [`Principal`] into request extensions. Rejections respond immediately;
//! handlers behind this middleware never run unauthenticated.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, Response},
    middleware::Next,
    response::IntoResponse,
};
use chrono::Utc;
use cookie::Cookie;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::auth::{self, AuthError, CarrierSet};
use crate::AppState;

/// Middleware that authenticates the request or rejects it.
///
/// A missing credential is a 401; a credential that fails verification
/// (bad signature, malformed, expired) is a 403. Credential values are
/// never logged.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let carriers = carriers_from_headers(request.headers(), &state.config.auth.cookie_name);

    let result = auth::authenticate(
        &carriers,
        state.config.auth.carrier_precedence,
        state.config.auth.secret.as_bytes(),
        Utc::now(),
    );

    match result {
        Ok(principal) => {
            tracing::debug!(principal = principal.id, "Authenticated request");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(AuthError::MissingCredential) => {
            tracing::debug!("No credential provided in request");
            ApiError::unauthorized("Access token is required").into_response()
        }
        Err(AuthError::InvalidCredential) => {
            tracing::debug!("Credential failed verification");
            ApiError::forbidden("Invalid or expired token").into_response()
        }
    }
}

/// Build the carrier set from request headers.
///
/// The authorization carrier is the raw header value; the cookie carrier is
/// the value of the named cookie, searched across all `Cookie` headers.
pub(crate) fn carriers_from_headers(headers: &HeaderMap, cookie_name: &str) -> CarrierSet {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == cookie_name)
        .map(|c| c.value().to_string());

    CarrierSet {
        authorization,
        cookie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_authorization_header_is_carried_raw() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc")]);
        let carriers = carriers_from_headers(&map, "token");
        assert_eq!(carriers.authorization.as_deref(), Some("Bearer abc"));
        assert!(carriers.cookie.is_none());
    }

    #[test]
    fn test_named_cookie_is_found_among_others() {
        let map = headers(&[(header::COOKIE, "theme=dark; token=tok123; lang=uk")]);
        let carriers = carriers_from_headers(&map, "token");
        assert_eq!(carriers.cookie.as_deref(), Some("tok123"));
    }

    #[test]
    fn test_cookie_searched_across_multiple_headers() {
        let map = headers(&[
            (header::COOKIE, "theme=dark"),
            (header::COOKIE, "token=tok456"),
        ]);
        let carriers = carriers_from_headers(&map, "token");
        assert_eq!(carriers.cookie.as_deref(), Some("tok456"));
    }

    #[test]
    fn test_absent_carriers_are_none() {
        let carriers = carriers_from_headers(&HeaderMap::new(), "token");
        assert!(carriers.authorization.is_none());
        assert!(carriers.cookie.is_none());
    }
}
