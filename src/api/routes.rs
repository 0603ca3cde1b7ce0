use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::require_auth;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Attempt routes -- every one sits behind the authentication gate
    let mut protected = Router::new()
        .route(
            "/attempts",
            post(handlers::create_attempt).put(handlers::complete_attempt),
        )
        .route("/attempts/user/:user_id", get(handlers::list_attempts))
        .route(
            "/attempts/user/:user_id/active",
            get(handlers::get_active_attempt),
        );

    // Test-only routes -- dangerous operations gated behind TEST_MODE
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        protected = protected.route("/admin/purge", delete(handlers::admin_purge));
    }

    let protected = protected.route_layer(middleware::from_fn_with_state(
        Arc::clone(&state),
        require_auth,
    ));

    // Unauthenticated routes
    let public = Router::new().route("/_internal/health", get(handlers::health));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured origins.
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .node
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring malformed allowed origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_methods([Method::DELETE, Method::GET, Method::POST, Method::PUT])
}
