//! Attempt lifecycle operations: create, transition, list, get-active.
//!
//! The transition is optimistic: the caller must supply the attempt's current
//! status, and only rows still in that status are updated. Two callers racing
//! on stale state cannot both succeed — the store serializes the conditional
//! update, so the loser's predicate matches zero rows.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::models::TestAttempt;
use crate::storage::Database;

/// The reserved status code for an attempt that is in progress.
pub const STATUS_ACTIVE: i32 = 1;

#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Attempt not found")]
    NotFound,
}

/// Input for [`create`]. Fields are validated for explicit presence, never
/// truthiness: `status = 0` is a valid, present value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateAttempt {
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub test_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Input for [`transition`]. `status` is the status to move to; `old_status`
/// is the expected current status (the optimistic guard).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompleteAttempt {
    #[serde(default)]
    pub old_status: Option<i32>,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Create a new attempt with `started_at` set to the current server time.
pub fn create(db: &Database, input: &CreateAttempt) -> Result<TestAttempt, AttemptError> {
    let user_id = input
        .user_id
        .ok_or(AttemptError::InvalidInput("user_id is required"))?;
    let test_id = input
        .test_id
        .ok_or(AttemptError::InvalidInput("test_id is required"))?;
    let status = input
        .status
        .ok_or(AttemptError::InvalidInput("status is required"))?;

    let attempt = db.insert_attempt(user_id, test_id, status, Utc::now())?;
    tracing::debug!(id = attempt.id, user_id, test_id, "Created attempt");

    Ok(attempt)
}

/// Transition every attempt of the user still in `old_status` to `status`,
/// recording the score and completion time.
///
/// Zero matched rows is `NotFound` — no attempt was in the expected prior
/// state. More than one matched row is a permitted broadcast update; all
/// matching rows are updated identically.
pub fn transition(
    db: &Database,
    input: &CompleteAttempt,
) -> Result<Vec<TestAttempt>, AttemptError> {
    let user_id = input
        .user_id
        .ok_or(AttemptError::InvalidInput("user_id is required"))?;
    let score = input
        .score
        .ok_or(AttemptError::InvalidInput("score is required"))?;
    let new_status = input
        .status
        .ok_or(AttemptError::InvalidInput("status is required"))?;
    let old_status = input
        .old_status
        .ok_or(AttemptError::InvalidInput("old_status is required"))?;

    let updated = db.transition_attempts(user_id, old_status, new_status, score, Utc::now())?;
    if updated.is_empty() {
        return Err(AttemptError::NotFound);
    }

    tracing::debug!(
        user_id,
        old_status,
        new_status,
        count = updated.len(),
        "Transitioned attempt(s)"
    );
    Ok(updated)
}

/// List every attempt for the user, most recent first.
///
/// An empty list is a valid outcome, not an error.
pub fn list_all(db: &Database, user_id: i64) -> Result<Vec<TestAttempt>, AttemptError> {
    Ok(db.attempts_by_user(user_id)?)
}

/// Get the most recent attempt with the active status code.
///
/// Multiple active attempts per user are permitted; ties on `started_at`
/// break toward the higher id.
pub fn get_active(db: &Database, user_id: i64) -> Result<TestAttempt, AttemptError> {
    db.attempts_by_user(user_id)?
        .into_iter()
        .find(|a| a.status == STATUS_ACTIVE)
        .ok_or(AttemptError::NotFound)
}
