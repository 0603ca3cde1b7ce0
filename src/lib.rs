//! attempt-tracker - A small timed-test attempt tracking service
//!
//! This crate provides test-attempt tracking with:
//! - Token authentication from header or cookie carriers (HMAC-SHA256 signed tokens)
//! - Optimistic, predicate-guarded attempt completion, safe under duplicate requests
//! - redb embedded database (ACID, MVCC, crash-safe)
//! - REST API

pub mod api;
pub mod attempts;
pub mod auth;
pub mod config;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
}
