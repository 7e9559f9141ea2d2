//! Stateless question and guess endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use gtp_common::Difficulty;
use serde::Deserialize;

use crate::api::ApiError;
use crate::services::game::{GameStats, GuessOutcome, Question, DEFAULT_TOP_N};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    #[serde(default = "default_top_n")]
    pub top_n: i64,
}

fn default_top_n() -> i64 {
    DEFAULT_TOP_N
}

/// GET /game/question/:difficulty
pub async fn random_question(
    State(state): State<AppState>,
    Path(difficulty): Path<String>,
    Query(query): Query<QuestionQuery>,
) -> Result<Json<Question>, ApiError> {
    let difficulty: Difficulty = difficulty.parse()?;
    let question = state
        .game
        .pick_random_question(difficulty, query.top_n)
        .await?;
    Ok(Json(question))
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub player_id: String,
    pub guess: String,
}

/// POST /game/guess
///
/// Stateless scoring: the caller names the target player. Session play goes
/// through /session/:id/guess instead, which pins the target server-side.
pub async fn check_guess(
    State(state): State<AppState>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GuessOutcome>, ApiError> {
    let outcome = state
        .game
        .check_guess(&request.player_id, &request.guess)
        .await?;
    Ok(Json(outcome))
}

/// GET /game/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<GameStats>, ApiError> {
    Ok(Json(state.game.stats().await?))
}
