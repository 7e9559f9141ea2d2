//! Service banner and health probe

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::AppState;

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Guess the Player API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health
///
/// Always answers 200; the body says whether the database is reachable so
/// monitoring can tell a degraded server from a dead one.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "connected",
        Err(e) => {
            warn!("Health probe could not reach the database: {}", e);
            "unavailable"
        }
    };

    let status = if database == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Json(json!({
        "status": status,
        "database": database,
    }))
}
