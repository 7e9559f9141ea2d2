//! Table definitions shared by the game server and the preparation pipeline
//!
//! `players` and `transfers` are populated by the external scraper; this
//! workspace only reads them. `questions` is owned by the preparation
//! pipeline, which drops and recreates it on every rebuild, so its DDL
//! lives here as a single constant used by both the bootstrap path and
//! the rebuild transaction.

use crate::Result;
use sqlx::SqlitePool;

/// Scraped player roster. `market_value` is the prominence key used for
/// top-N question windows; NULL when the source page had no valuation.
pub const CREATE_PLAYERS: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    player_id TEXT PRIMARY KEY,
    player_name TEXT NOT NULL,
    market_value REAL
)
"#;

/// Raw transfer log in scrape order (most recent transfer first).
/// `id` preserves insertion order so readers can reconstruct chronology.
pub const CREATE_TRANSFERS: &str = r#"
CREATE TABLE IF NOT EXISTS transfers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id TEXT NOT NULL,
    to_club TEXT,
    to_club_image_url TEXT,
    season TEXT,
    transfer_date TEXT,
    fee TEXT
)
"#;

/// Derived question table, one row per player with a playable career.
pub const CREATE_QUESTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
    player_id TEXT PRIMARY KEY,
    player_name TEXT NOT NULL,
    market_value REAL NOT NULL DEFAULT 0,
    stint_count INTEGER NOT NULL,
    shared_by INTEGER NOT NULL,
    difficulty TEXT NOT NULL,
    sequence_key TEXT NOT NULL,
    stints_json TEXT NOT NULL
)
"#;

pub const QUESTION_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_questions_difficulty ON questions(difficulty)",
    "CREATE INDEX IF NOT EXISTS idx_questions_sequence ON questions(sequence_key)",
];

/// Create every table this workspace knows about. Idempotent.
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    for ddl in [CREATE_PLAYERS, CREATE_TRANSFERS, CREATE_QUESTIONS] {
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in QUESTION_INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
