use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single attempt at a timed test.
///
/// `started_at` is assigned once, at creation, and never mutated. `score` and
/// `completed_at` stay absent until a successful status transition; a further
/// successful transition overwrites them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAttempt {
    /// When the attempt was completed (absent while in progress)
    pub completed_at: Option<DateTime<Utc>>,
    /// Store-assigned identity, monotonically increasing
    pub id: u64,
    /// Score recorded at completion (absent while in progress)
    pub score: Option<i32>,
    /// When the attempt was started (server clock)
    pub started_at: DateTime<Utc>,
    /// Caller-defined status code; `1` is the reserved "active" code
    pub status: i32,
    /// Opaque reference to the test content
    pub test_id: i64,
    /// The user the attempt belongs to
    pub user_id: i64,
}
