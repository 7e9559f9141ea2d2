//! Session storage abstraction
//!
//! Sessions are opaque JSON records with a fixed-window TTL. The contract is
//! deliberately narrow so an external backend (e.g. Redis) can slot in later;
//! the server picks one implementation at startup and shares it behind an
//! `Arc`.

mod memory;

pub use memory::MemorySessionStore;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Storage contract for live game sessions.
///
/// Keys are plain strings (`session:{uuid}`), values opaque JSON. Expired
/// entries behave as absent everywhere.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `value` under `key` with a fresh time-to-live.
    async fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Fetch a copy of the value, or `None` if missing or expired.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Remove the entry. Returns whether a live entry existed.
    async fn delete(&self, key: &str) -> bool;

    /// Replace the value of an existing entry without touching its expiry
    /// deadline. Returns `false` if the key is missing or expired.
    async fn update(&self, key: &str, value: Value) -> bool;

    /// Whether a live entry exists.
    async fn exists(&self, key: &str) -> bool;

    /// Drop every expired entry, returning how many were removed.
    async fn cleanup_expired(&self) -> usize;

    /// Keys of live entries matching a glob pattern (`*` and `?`).
    async fn list_keys(&self, pattern: &str) -> Vec<String>;
}

/// Glob match supporting `*` (any run) and `?` (any single character).
pub(crate) fn key_matches(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();
    let (mut pi, mut ki) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == k[ki]) {
            pi += 1;
            ki += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ki));
            pi += 1;
        } else if let Some((star_pi, star_ki)) = star {
            // Backtrack: let the last `*` swallow one more character.
            pi = star_pi + 1;
            ki = star_ki + 1;
            star = Some((star_pi, star_ki + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
