//! gtp-gs library - Guess The Player game server
//!
//! Serves career-sequence trivia over HTTP: random questions by difficulty,
//! guess scoring with fuzzy name matching, fuzzy player lookup, and
//! TTL-bounded play sessions. All question data comes from the `questions`
//! table built offline by gtp-dp.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use gtp_common::config::GameConfig;

pub mod api;
pub mod fuzzy;
pub mod images;
pub mod services;
pub mod store;

use services::game::GameService;
use services::session::SessionManager;
use store::{MemorySessionStore, SessionStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Question selection, guess scoring, lookup, stats
    pub game: Arc<GameService>,
    /// Stateful session play on top of the game service
    pub sessions: Arc<SessionManager>,
    /// Database connection pool (read-only at request time)
    pub db: SqlitePool,
    /// Resolved runtime configuration
    pub config: GameConfig,
}

impl AppState {
    /// Wire the full service stack over an open database pool.
    pub fn new(db: SqlitePool, config: GameConfig) -> Self {
        let game = Arc::new(GameService::new(db.clone(), &config));
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let sessions = Arc::new(SessionManager::new(store, Arc::clone(&game), &config));

        Self {
            game,
            sessions,
            db,
            config,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    Router::new()
        .route("/", get(api::health::root))
        .route("/health", get(api::health::health))
        .route("/game/question/:difficulty", get(api::game::random_question))
        .route("/game/guess", post(api::game::check_guess))
        .route("/game/stats", get(api::game::stats))
        .route("/player/:name", get(api::player::lookup))
        .route("/session/start", post(api::session::start))
        .route("/session/:session_id/guess", post(api::session::guess))
        .route("/session/:session_id/next", post(api::session::next))
        .route("/session/:session_id/status", get(api::session::status))
        .route("/session/:session_id", delete(api::session::end))
        .nest_service("/static", ServeDir::new(&state.config.static_root))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
