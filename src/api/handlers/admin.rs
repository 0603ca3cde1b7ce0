use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub attempts_deleted: u64,
}

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Purge all attempt data (for testing only)
pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    match state.db.purge_all() {
        Ok(stats) => {
            tracing::warn!(attempts = stats.attempts, "Purged all data");
            Ok(JSend::success(PurgeResponse {
                attempts_deleted: stats.attempts,
            }))
        }
        Err(e) => Err(ApiError::internal(format!("Failed to purge data: {e}"))),
    }
}
