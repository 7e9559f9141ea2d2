//! Transactional rebuild of the questions table
//!
//! The table is always rewritten from scratch: sharing counts are batch
//! statistics, so patching rows incrementally would leave stale counts
//! behind. Drop, recreate and insert happen inside one transaction so
//! readers never observe a half-written batch.

use std::collections::HashMap;

use gtp_common::db::schema;
use gtp_common::model::Difficulty;
use gtp_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

use crate::classifier::{build_question_records, PlayerCareer};
use crate::cleaner::{clean_transfers, RawTransfer};

/// Outcome counters for one rebuild run.
#[derive(Debug, Default)]
pub struct RebuildSummary {
    pub total_players: usize,
    pub questions_written: usize,
    /// Players whose careers cleaned down to nothing (youth/reserve only)
    pub skipped_empty: usize,
    pub by_difficulty: HashMap<Difficulty, usize>,
}

impl RebuildSummary {
    /// Log the outcome and difficulty distribution.
    pub fn log(&self) {
        info!(
            "Rebuilt questions: {} written from {} players ({} skipped with no senior-club career)",
            self.questions_written, self.total_players, self.skipped_empty
        );
        for tier in Difficulty::ALL {
            let count = self.by_difficulty.get(&tier).copied().unwrap_or(0);
            let pct = if self.questions_written > 0 {
                count as f64 / self.questions_written as f64 * 100.0
            } else {
                0.0
            };
            info!("  {:<8} {:>5} questions ({:.1}%)", tier.as_str(), count, pct);
        }
    }
}

/// Rebuild the questions table from the scraped players/transfers tables.
pub async fn rebuild_questions(pool: &SqlitePool) -> Result<RebuildSummary> {
    let transfer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transfers")
        .fetch_one(pool)
        .await?;
    if transfer_count == 0 {
        return Err(Error::InvalidState(
            "transfers table is empty; run the scraper first".to_string(),
        ));
    }
    info!("Found {} transfer records", transfer_count);

    let players: Vec<(String, String, Option<f64>)> = sqlx::query_as(
        "SELECT player_id, player_name, market_value FROM players ORDER BY player_name",
    )
    .fetch_all(pool)
    .await?;

    let mut summary = RebuildSummary {
        total_players: players.len(),
        ..Default::default()
    };

    let mut careers = Vec::new();
    for (player_id, player_name, market_value) in players {
        // Scrape order is most recent first; id DESC restores chronology
        let rows: Vec<(String, Option<String>, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT to_club, to_club_image_url, season, fee \
             FROM transfers \
             WHERE player_id = ? AND to_club IS NOT NULL \
             ORDER BY id DESC",
        )
        .bind(&player_id)
        .fetch_all(pool)
        .await?;

        if rows.is_empty() {
            continue;
        }

        let raw: Vec<RawTransfer> = rows
            .into_iter()
            .map(|(club, logo, season, fee)| RawTransfer {
                club,
                logo,
                season: season.unwrap_or_default(),
                fee: fee.unwrap_or_default(),
            })
            .collect();

        let stints = clean_transfers(&raw);
        if stints.is_empty() {
            summary.skipped_empty += 1;
            continue;
        }

        careers.push(PlayerCareer {
            player_id,
            player_name,
            market_value: market_value.unwrap_or(0.0),
            stints,
        });
    }

    let records = build_question_records(careers);

    let mut tx = pool.begin().await?;
    sqlx::query("DROP TABLE IF EXISTS questions")
        .execute(&mut *tx)
        .await?;
    sqlx::query(schema::CREATE_QUESTIONS).execute(&mut *tx).await?;
    for ddl in schema::QUESTION_INDEXES {
        sqlx::query(ddl).execute(&mut *tx).await?;
    }

    for record in &records {
        let stints_json = serde_json::to_string(&record.stints)?;
        sqlx::query(
            "INSERT INTO questions \
             (player_id, player_name, market_value, stint_count, shared_by, \
              difficulty, sequence_key, stints_json) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.player_id)
        .bind(&record.player_name)
        .bind(record.market_value)
        .bind(record.stint_count as i64)
        .bind(record.shared_by)
        .bind(record.difficulty.as_str())
        .bind(&record.sequence_key)
        .bind(stints_json)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    summary.questions_written = records.len();
    for record in &records {
        *summary.by_difficulty.entry(record.difficulty).or_insert(0) += 1;
    }

    Ok(summary)
}
