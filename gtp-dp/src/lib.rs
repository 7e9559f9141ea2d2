//! # GTP Data Preparation Library (gtp-dp)
//!
//! Offline pipeline that turns scraped transfer histories into the
//! question table served by the game server.
//!
//! **Stages:** cleaner (raw transfers to career stints) -> classifier
//! (difficulty tiers, shared-sequence counts) -> transactional rebuild
//! of the `questions` table.

pub mod classifier;
pub mod cleaner;
pub mod rebuild;
