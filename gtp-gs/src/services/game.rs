//! Question selection, guess evaluation and player lookup
//!
//! All reads go against the `questions` table built by the offline pipeline.
//! Random questions are drawn from a prominence window: the `top_n` most
//! valuable players by market value, then filtered by difficulty, so casual
//! players see household names and completionists can widen the pool.

use gtp_common::config::GameConfig;
use gtp_common::{Difficulty, Error, Result, Stint};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::fuzzy;
use crate::images::ImageResolver;

/// Widest prominence window, also the request default.
pub const DEFAULT_TOP_N: i64 = 5000;

/// A question as shown to the player. The answer stays server-side.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub player_id: String,
    pub difficulty: Difficulty,
    pub stint_count: usize,
    pub shared_by: i64,
    pub stints: Vec<Stint>,
}

/// One acceptable answer to a question.
#[derive(Debug, Clone, Serialize)]
pub struct PossibleAnswer {
    pub name: String,
    pub image_url: String,
}

/// Outcome of scoring a guess against a question.
#[derive(Debug, Clone, Serialize)]
pub struct GuessOutcome {
    pub correct: bool,
    pub actual_answer: String,
    pub similarity_score: u8,
    pub all_possible_answers: Vec<PossibleAnswer>,
}

/// Full profile returned by free-text player lookup.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerProfile {
    pub player_id: String,
    pub player_name: String,
    pub stint_count: usize,
    pub shared_by: i64,
    pub difficulty: Difficulty,
    pub stints: Vec<Stint>,
}

#[derive(Debug, Serialize)]
pub struct DifficultyStats {
    pub difficulty: Difficulty,
    pub count: i64,
    pub avg_stints: f64,
    pub min_stints: i64,
    pub max_stints: i64,
}

#[derive(Debug, Serialize)]
pub struct GameStats {
    pub total_questions: i64,
    pub by_difficulty: Vec<DifficultyStats>,
}

/// (player_id, stint_count, shared_by, difficulty, stints_json)
type QuestionRow = (String, i64, i64, String, String);

pub struct GameService {
    pool: SqlitePool,
    images: ImageResolver,
    match_threshold: u8,
    lookup_threshold: u8,
}

impl GameService {
    pub fn new(pool: SqlitePool, config: &GameConfig) -> Self {
        GameService {
            pool,
            images: ImageResolver::new(&config.static_root),
            match_threshold: config.fuzzy_match_threshold,
            lookup_threshold: config.player_lookup_threshold,
        }
    }

    /// Draw a random question of the given difficulty from the top-`top_n`
    /// players by market value. `top_n` outside [1, 5000] is clamped.
    pub async fn pick_random_question(
        &self,
        difficulty: Difficulty,
        top_n: i64,
    ) -> Result<Question> {
        let top_n = clamp_top_n(top_n);

        // The prominence window applies before the difficulty filter, so a
        // narrow window can legitimately have no questions of some tier.
        let row: Option<QuestionRow> = sqlx::query_as(
            r#"
            SELECT player_id, stint_count, shared_by, difficulty, stints_json
            FROM (SELECT * FROM questions ORDER BY market_value DESC LIMIT ?)
            WHERE difficulty = ?
            ORDER BY RANDOM()
            LIMIT 1
            "#,
        )
        .bind(top_n)
        .bind(difficulty.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.build_question(row),
            None => Err(Error::NotFound(format!(
                "No {} questions available in the top {} players",
                difficulty, top_n
            ))),
        }
    }

    pub async fn get_question_by_id(&self, player_id: &str) -> Result<Question> {
        let row: Option<QuestionRow> = sqlx::query_as(
            "SELECT player_id, stint_count, shared_by, difficulty, stints_json
             FROM questions WHERE player_id = ?",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.build_question(row),
            None => Err(Error::NotFound("Player not found".to_string())),
        }
    }

    /// Score a guess against the question identified by `player_id`.
    ///
    /// Every player sharing the target's career sequence is an acceptable
    /// answer; the guess is compared against all of them and the best
    /// similarity wins. `actual_answer` is always the target's own name.
    pub async fn check_guess(&self, player_id: &str, raw_guess: &str) -> Result<GuessOutcome> {
        let guess = fuzzy::sanitize_guess(raw_guess);
        if guess.is_empty() {
            return Err(Error::InvalidInput(
                "Guess must contain at least one letter or digit".to_string(),
            ));
        }

        let target: Option<(String, String)> =
            sqlx::query_as("SELECT player_name, sequence_key FROM questions WHERE player_id = ?")
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;

        let (actual_answer, sequence_key) =
            target.ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

        let candidates: Vec<(String, String)> = sqlx::query_as(
            "SELECT player_id, player_name FROM questions
             WHERE sequence_key = ? ORDER BY player_id",
        )
        .bind(&sequence_key)
        .fetch_all(&self.pool)
        .await?;

        let names: Vec<&str> = candidates.iter().map(|(_, name)| name.as_str()).collect();
        let (_, similarity_score) = fuzzy::best_match(&guess, &names).ok_or_else(|| {
            Error::InvalidState(format!("no candidates share the sequence of player {}", player_id))
        })?;

        let correct = similarity_score >= self.match_threshold;

        let all_possible_answers = candidates
            .into_iter()
            .map(|(id, name)| PossibleAnswer {
                image_url: self.images.player_image_url(&id, None),
                name,
            })
            .collect();

        Ok(GuessOutcome {
            correct,
            actual_answer,
            similarity_score,
            all_possible_answers,
        })
    }

    /// All (player_id, player_name) pairs, ordered by id.
    pub async fn get_all_names(&self) -> Result<Vec<(String, String)>> {
        let names =
            sqlx::query_as("SELECT player_id, player_name FROM questions ORDER BY player_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(names)
    }

    /// Resolve free text to the closest known player.
    pub async fn lookup_player(&self, raw_name: &str) -> Result<PlayerProfile> {
        let wanted = fuzzy::sanitize_guess(raw_name);
        if wanted.is_empty() {
            return Err(Error::InvalidInput(
                "Player name must contain at least one letter or digit".to_string(),
            ));
        }

        let players = self.get_all_names().await?;

        let names: Vec<&str> = players.iter().map(|(_, name)| name.as_str()).collect();
        let best = fuzzy::best_match(&wanted, &names)
            .filter(|(_, score)| *score >= self.lookup_threshold);

        let (index, _) = best.ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

        self.player_profile(&players[index].0).await
    }

    async fn player_profile(&self, player_id: &str) -> Result<PlayerProfile> {
        let row: Option<(String, String, i64, i64, String, String)> = sqlx::query_as(
            "SELECT player_id, player_name, stint_count, shared_by, difficulty, stints_json
             FROM questions WHERE player_id = ?",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        let (player_id, player_name, stint_count, shared_by, difficulty, stints_json) =
            row.ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

        Ok(PlayerProfile {
            player_id,
            player_name,
            stint_count: stint_count as usize,
            shared_by,
            difficulty: parse_stored_difficulty(&difficulty)?,
            stints: self.resolve_stints(&stints_json)?,
        })
    }

    /// Question counts and stint spreads, always in short, moderate, long
    /// order with zero rows for empty tiers.
    pub async fn stats(&self) -> Result<GameStats> {
        let total_questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await?;

        let mut by_difficulty = Vec::with_capacity(Difficulty::ALL.len());
        for difficulty in Difficulty::ALL {
            let (count, avg, min, max): (i64, Option<f64>, Option<i64>, Option<i64>) =
                sqlx::query_as(
                    "SELECT COUNT(*), ROUND(AVG(stint_count), 2), MIN(stint_count), MAX(stint_count)
                     FROM questions WHERE difficulty = ?",
                )
                .bind(difficulty.as_str())
                .fetch_one(&self.pool)
                .await?;

            by_difficulty.push(DifficultyStats {
                difficulty,
                count,
                avg_stints: avg.unwrap_or(0.0),
                min_stints: min.unwrap_or(0),
                max_stints: max.unwrap_or(0),
            });
        }

        Ok(GameStats {
            total_questions,
            by_difficulty,
        })
    }

    fn build_question(&self, row: QuestionRow) -> Result<Question> {
        let (player_id, stint_count, shared_by, difficulty, stints_json) = row;
        Ok(Question {
            player_id,
            difficulty: parse_stored_difficulty(&difficulty)?,
            stint_count: stint_count as usize,
            shared_by,
            stints: self.resolve_stints(&stints_json)?,
        })
    }

    fn resolve_stints(&self, stints_json: &str) -> Result<Vec<Stint>> {
        let stints: Vec<Stint> = serde_json::from_str(stints_json)?;
        Ok(stints
            .into_iter()
            .map(|stint| {
                let logo = self.images.club_logo_url(stint.logo.as_deref());
                Stint {
                    logo: Some(logo),
                    ..stint
                }
            })
            .collect())
    }
}

fn clamp_top_n(top_n: i64) -> i64 {
    top_n.clamp(1, DEFAULT_TOP_N)
}

fn parse_stored_difficulty(raw: &str) -> Result<Difficulty> {
    raw.parse()
        .map_err(|_| Error::InvalidState(format!("stored difficulty '{}' is unknown", raw)))
}
