//! Session lifecycle and stateful gameplay
//!
//! Sessions are stored as opaque JSON records keyed `session:{uuid}` with a
//! fixed TTL window from creation; activity never extends the window. Every
//! operation is read-modify-write against the store, so two simultaneous
//! requests for one session are last-write-wins.

use chrono::{DateTime, Utc};
use gtp_common::config::GameConfig;
use gtp_common::{Difficulty, Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::services::game::{GameService, PossibleAnswer, Question};
use crate::store::SessionStore;

/// Stored session state. Never leaves the server unfiltered; the current
/// player id in particular is the answer to the open question.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    session_id: String,
    difficulty: Difficulty,
    top_n: i64,
    current_question_player_id: Option<String>,
    score: u32,
    total_attempts: u32,
    correct_guesses: u32,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionStarted {
    pub session_id: String,
    pub question: Question,
    pub score: u32,
    pub total_attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct SessionGuess {
    pub correct: bool,
    pub actual_answer: String,
    pub similarity_score: u8,
    pub all_possible_answers: Vec<PossibleAnswer>,
    pub session_score: u32,
    pub total_attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct NextQuestion {
    pub question: Question,
    pub session_score: u32,
    pub total_attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub score: u32,
    pub total_attempts: u32,
    pub correct_guesses: u32,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub final_score: u32,
    pub total_attempts: u32,
    pub correct_guesses: u32,
    pub accuracy: f64,
    pub difficulty: Difficulty,
    pub duration: String,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    game: Arc<GameService>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, game: Arc<GameService>, config: &GameConfig) -> Self {
        SessionManager {
            store,
            game,
            ttl: Duration::from_secs(config.session_ttl_secs),
        }
    }

    /// Start a session: draw a first question and store zeroed counters.
    pub async fn create(&self, difficulty: Difficulty, top_n: i64) -> Result<SessionStarted> {
        let question = self.game.pick_random_question(difficulty, top_n).await?;

        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let record = SessionRecord {
            session_id: session_id.to_string(),
            difficulty,
            top_n,
            current_question_player_id: Some(question.player_id.clone()),
            score: 0,
            total_attempts: 0,
            correct_guesses: 0,
            created_at: now,
            last_activity: now,
        };

        self.store
            .set(&session_key(session_id), serde_json::to_value(&record)?, self.ttl)
            .await;

        info!(%session_id, difficulty = %difficulty, "Session started");

        Ok(SessionStarted {
            session_id: record.session_id,
            question,
            score: 0,
            total_attempts: 0,
        })
    }

    /// Score a guess against the session's own current question.
    ///
    /// The player id under evaluation always comes from the stored session,
    /// never from the client, so a caller cannot aim its guess at an easier
    /// target.
    pub async fn submit_guess(&self, session_id: &str, raw_guess: &str) -> Result<SessionGuess> {
        let key = session_key(parse_session_id(session_id)?);
        let mut record = self.load(&key).await?;

        let player_id = record
            .current_question_player_id
            .clone()
            .ok_or_else(|| Error::InvalidState("session has no active question".to_string()))?;

        let outcome = self.game.check_guess(&player_id, raw_guess).await?;

        record.total_attempts += 1;
        record.last_activity = Utc::now();
        if outcome.correct {
            record.score += 1;
            record.correct_guesses += 1;
        }

        self.save(&key, &record).await?;

        Ok(SessionGuess {
            correct: outcome.correct,
            actual_answer: outcome.actual_answer,
            similarity_score: outcome.similarity_score,
            all_possible_answers: outcome.all_possible_answers,
            session_score: record.score,
            total_attempts: record.total_attempts,
        })
    }

    /// Move the session to a fresh question.
    ///
    /// Supplied difficulty/top_n overrides replace the stored values for the
    /// rest of the session; omitted ones reuse what is stored. The TTL is
    /// not refreshed.
    pub async fn advance(
        &self,
        session_id: &str,
        difficulty: Option<Difficulty>,
        top_n: Option<i64>,
    ) -> Result<NextQuestion> {
        let key = session_key(parse_session_id(session_id)?);
        let mut record = self.load(&key).await?;

        if let Some(difficulty) = difficulty {
            record.difficulty = difficulty;
        }
        if let Some(top_n) = top_n {
            record.top_n = top_n;
        }

        let question = self
            .game
            .pick_random_question(record.difficulty, record.top_n)
            .await?;

        record.current_question_player_id = Some(question.player_id.clone());
        record.last_activity = Utc::now();

        self.save(&key, &record).await?;

        Ok(NextQuestion {
            question,
            session_score: record.score,
            total_attempts: record.total_attempts,
        })
    }

    /// Counters and timestamps, without the current player id.
    pub async fn status(&self, session_id: &str) -> Result<SessionStatus> {
        let key = session_key(parse_session_id(session_id)?);
        let record = self.load(&key).await?;

        Ok(SessionStatus {
            session_id: record.session_id,
            score: record.score,
            total_attempts: record.total_attempts,
            correct_guesses: record.correct_guesses,
            created_at: record.created_at,
            last_activity: record.last_activity,
        })
    }

    /// Delete the session and report its final line.
    pub async fn end(&self, session_id: &str) -> Result<SessionSummary> {
        let key = session_key(parse_session_id(session_id)?);
        let record = self.load(&key).await?;

        let accuracy = if record.total_attempts > 0 {
            f64::from(record.correct_guesses) / f64::from(record.total_attempts) * 100.0
        } else {
            0.0
        };

        self.store.delete(&key).await;

        info!(session_id = %record.session_id, score = record.score, "Session ended");

        Ok(SessionSummary {
            session_id: record.session_id,
            final_score: record.score,
            total_attempts: record.total_attempts,
            correct_guesses: record.correct_guesses,
            accuracy,
            difficulty: record.difficulty,
            duration: format_duration(Utc::now() - record.created_at),
        })
    }

    /// Drop expired sessions; returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.cleanup_expired().await
    }

    async fn load(&self, key: &str) -> Result<SessionRecord> {
        let value = self
            .store
            .get(key)
            .await
            .ok_or_else(|| Error::NotFound("Session not found or expired".to_string()))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn save(&self, key: &str, record: &SessionRecord) -> Result<()> {
        let updated = self.store.update(key, serde_json::to_value(record)?).await;
        if !updated {
            // Expired between our read and this write-back.
            return Err(Error::NotFound("Session not found or expired".to_string()));
        }
        Ok(())
    }
}

fn session_key(id: Uuid) -> String {
    format!("session:{id}")
}

fn parse_session_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| Error::InvalidInput(format!("'{raw}' is not a valid session id")))
}

fn format_duration(elapsed: chrono::Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    format!("{}m {}s", total / 60, total % 60)
}
