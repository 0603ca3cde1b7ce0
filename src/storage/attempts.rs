use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::TestAttempt;
use super::tables::*;

impl Database {
    // ========================================================================
    // Attempt operations
    // ========================================================================

    /// Insert a new attempt, assigning the next id.
    ///
    /// The id and the user index are updated in the same write transaction,
    /// so a crash never leaves an attempt unreachable from its user.
    pub fn insert_attempt(
        &self,
        user_id: i64,
        test_id: i64,
        status: i32,
        started_at: DateTime<Utc>,
    ) -> Result<TestAttempt, DatabaseError> {
        let write_txn = self.begin_write()?;
        let attempt = {
            let mut table = write_txn.open_table(ATTEMPTS)?;

            let id = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 1,
            };

            let attempt = TestAttempt {
                completed_at: None,
                id,
                score: None,
                started_at,
                status,
                test_id,
                user_id,
            };
            let data = bincode::serialize(&attempt)?;
            table.insert(id, data.as_slice())?;

            // Update user_attempts index
            let mut index_table = write_txn.open_table(USER_ATTEMPTS)?;
            let mut ids: Vec<u64> = index_table
                .get(user_id)?
                .map(|v| bincode::deserialize(v.value()))
                .transpose()?
                .unwrap_or_default();
            ids.push(id);
            let index_data = bincode::serialize(&ids)?;
            index_table.insert(user_id, index_data.as_slice())?;

            attempt
        };
        write_txn.commit()?;
        Ok(attempt)
    }

    /// Get an attempt by id
    pub fn get_attempt(&self, id: u64) -> Result<Option<TestAttempt>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ATTEMPTS)?;

        match table.get(id)? {
            Some(data) => {
                let attempt: TestAttempt = bincode::deserialize(data.value())?;
                Ok(Some(attempt))
            }
            None => Ok(None),
        }
    }

    /// Get all attempts for a user, most recent first.
    ///
    /// Ordered by `started_at` descending; ids (also descending) break ties.
    pub fn attempts_by_user(&self, user_id: i64) -> Result<Vec<TestAttempt>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index_table = read_txn.open_table(USER_ATTEMPTS)?;
        let attempts_table = read_txn.open_table(ATTEMPTS)?;

        let ids: Vec<u64> = match index_table.get(user_id)? {
            Some(data) => bincode::deserialize(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut attempts = Vec::new();
        for id in ids {
            if let Some(data) = attempts_table.get(id)? {
                let attempt: TestAttempt = bincode::deserialize(data.value())?;
                attempts.push(attempt);
            }
        }

        attempts.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        Ok(attempts)
    }

    /// Apply the predicate-guarded transition: every attempt of `user_id`
    /// whose status equals `old_status` gets `new_status`, `score`, and
    /// `completed_at`. Returns the updated rows (possibly empty).
    ///
    /// Runs in a single write transaction. redb serializes writers, so of two
    /// racing calls with the same `old_status` at most one matches any rows.
    pub fn transition_attempts(
        &self,
        user_id: i64,
        old_status: i32,
        new_status: i32,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<Vec<TestAttempt>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let updated = {
            let ids: Vec<u64> = {
                let index_table = write_txn.open_table(USER_ATTEMPTS)?;
                let ids = index_table
                    .get(user_id)?
                    .map(|v| bincode::deserialize(v.value()))
                    .transpose()?
                    .unwrap_or_default();
                ids
            };

            let mut table = write_txn.open_table(ATTEMPTS)?;
            let mut updated = Vec::new();
            for id in ids {
                let existing: Option<TestAttempt> = {
                    match table.get(id)? {
                        Some(data) => Some(bincode::deserialize(data.value())?),
                        None => None,
                    }
                };

                let Some(mut attempt) = existing else {
                    continue;
                };
                if attempt.status != old_status {
                    continue;
                }

                attempt.status = new_status;
                attempt.score = Some(score);
                attempt.completed_at = Some(completed_at);

                let data = bincode::serialize(&attempt)?;
                table.insert(id, data.as_slice())?;
                updated.push(attempt);
            }
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }
}
