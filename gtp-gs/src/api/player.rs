//! Fuzzy player lookup

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::ApiError;
use crate::services::game::PlayerProfile;
use crate::AppState;

/// GET /player/:name
pub async fn lookup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerProfile>, ApiError> {
    Ok(Json(state.game.lookup_player(&name).await?))
}
