mod admin;
mod attempts;

pub use admin::{admin_purge, health};
pub use attempts::{complete_attempt, create_attempt, get_active_attempt, list_attempts};
