//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use chrono::Utc;
use tempfile::TempDir;

use crate::attempts::CreateAttempt;
use crate::auth::Claims;
use crate::storage::Database;

/// Signing secret used throughout the unit tests.
pub const TEST_SECRET: &[u8] = b"test-signing-secret-for-unit-tests";

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard — the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// Claims for `sub`, issued now, valid for an hour.
pub fn test_claims(sub: i64) -> Claims {
    Claims::new(sub, Utc::now(), 3600)
}

/// A fully-populated `CreateAttempt` input.
pub fn make_create(user_id: i64, test_id: i64, status: i32) -> CreateAttempt {
    CreateAttempt {
        status: Some(status),
        test_id: Some(test_id),
        user_id: Some(user_id),
    }
}
