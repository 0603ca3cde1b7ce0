mod attempts;
pub mod db;
pub mod models;
mod tables;

pub use db::{Database, DatabaseError};
pub use tables::*;
