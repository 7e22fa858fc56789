//! Database access for the directory store

pub mod claims;
pub mod init;
pub mod listings;

pub use init::{create_schema, init_database};
