//! Database access: schema definitions and connection setup

pub mod init;
pub mod schema;

pub use init::init_database;
