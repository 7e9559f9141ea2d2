//! # GTP Common Library
//!
//! Shared code for the Guess The Player services:
//! - Error and result types
//! - Configuration resolution
//! - Database schema and initialization
//! - Domain model (difficulty tiers, career stints, question records)

pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{Difficulty, QuestionRecord, Stint, SEQUENCE_DELIMITER};
