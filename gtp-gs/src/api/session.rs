//! Stateful session endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use gtp_common::Difficulty;
use serde::Deserialize;

use crate::api::ApiError;
use crate::services::game::DEFAULT_TOP_N;
use crate::services::session::{
    NextQuestion, SessionGuess, SessionStarted, SessionStatus, SessionSummary,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub difficulty: String,
    #[serde(default = "default_top_n")]
    pub top_n: i64,
}

fn default_top_n() -> i64 {
    DEFAULT_TOP_N
}

/// POST /session/start
pub async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<SessionStarted>, ApiError> {
    let difficulty: Difficulty = request.difficulty.parse()?;
    Ok(Json(state.sessions.create(difficulty, request.top_n).await?))
}

#[derive(Debug, Deserialize)]
pub struct SessionGuessRequest {
    pub guess: String,
}

/// POST /session/:session_id/guess
pub async fn guess(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SessionGuessRequest>,
) -> Result<Json<SessionGuess>, ApiError> {
    Ok(Json(
        state.sessions.submit_guess(&session_id, &request.guess).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct NextQuestionRequest {
    pub difficulty: Option<String>,
    pub top_n: Option<i64>,
}

/// POST /session/:session_id/next
///
/// Omitted fields reuse the session's stored difficulty/top_n; supplied ones
/// override them for the rest of the session.
pub async fn next(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<NextQuestionRequest>,
) -> Result<Json<NextQuestion>, ApiError> {
    let difficulty = match request.difficulty {
        Some(raw) => Some(raw.parse::<Difficulty>()?),
        None => None,
    };
    Ok(Json(
        state
            .sessions
            .advance(&session_id, difficulty, request.top_n)
            .await?,
    ))
}

/// GET /session/:session_id/status
pub async fn status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatus>, ApiError> {
    Ok(Json(state.sessions.status(&session_id).await?))
}

/// DELETE /session/:session_id
pub async fn end(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, ApiError> {
    Ok(Json(state.sessions.end(&session_id).await?))
}
