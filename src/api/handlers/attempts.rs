use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::attempts::{self, AttemptError, CompleteAttempt, CreateAttempt};
use crate::auth::Principal;
use crate::storage::models::TestAttempt;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub completed_at: Option<String>,
    pub id: u64,
    pub score: Option<i32>,
    pub started_at: String,
    pub status: i32,
    pub test_id: i64,
    pub user_id: i64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_attempt(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateAttempt>,
) -> Result<Json<JSend<AttemptResponse>>, ApiError> {
    match attempts::create(&state.db, &req) {
        Ok(attempt) => {
            tracing::debug!(id = attempt.id, principal = principal.id, "Attempt created");
            Ok(JSend::success(attempt_to_response(&attempt)))
        }
        Err(AttemptError::InvalidInput(msg)) => Err(ApiError::bad_request(msg)),
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

pub async fn complete_attempt(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CompleteAttempt>,
) -> Result<Json<JSend<Vec<AttemptResponse>>>, ApiError> {
    match attempts::transition(&state.db, &req) {
        Ok(updated) => {
            tracing::debug!(
                count = updated.len(),
                principal = principal.id,
                "Attempt(s) completed"
            );
            Ok(JSend::success(
                updated.iter().map(attempt_to_response).collect(),
            ))
        }
        Err(AttemptError::InvalidInput(msg)) => Err(ApiError::bad_request(msg)),
        Err(AttemptError::NotFound) => Err(ApiError::not_found(
            "No attempt with the expected status to update",
        )),
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

pub async fn list_attempts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<JSend<Vec<AttemptResponse>>>, ApiError> {
    match attempts::list_all(&state.db, user_id) {
        Ok(all) => Ok(JSend::success(all.iter().map(attempt_to_response).collect())),
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

pub async fn get_active_attempt(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<JSend<AttemptResponse>>, ApiError> {
    match attempts::get_active(&state.db, user_id) {
        Ok(attempt) => Ok(JSend::success(attempt_to_response(&attempt))),
        Err(AttemptError::NotFound) => Err(ApiError::not_found("No active attempt")),
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn attempt_to_response(attempt: &TestAttempt) -> AttemptResponse {
    AttemptResponse {
        completed_at: attempt.completed_at.map(|t| t.to_rfc3339()),
        id: attempt.id,
        score: attempt.score,
        started_at: attempt.started_at.to_rfc3339(),
        status: attempt.status,
        test_id: attempt.test_id,
        user_id: attempt.user_id,
    }
}
