use redb::TableDefinition;

/// Test attempts: attempt id -> TestAttempt (bincode)
pub const ATTEMPTS: TableDefinition<u64, &[u8]> = TableDefinition::new("attempts");

/// Secondary index: user_id -> Vec<attempt id> (for listing attempts by user)
pub const USER_ATTEMPTS: TableDefinition<i64, &[u8]> = TableDefinition::new("user_attempts");
