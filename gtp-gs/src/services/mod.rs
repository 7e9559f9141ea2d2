//! Business logic behind the HTTP handlers

pub mod cleanup;
pub mod game;
pub mod session;
