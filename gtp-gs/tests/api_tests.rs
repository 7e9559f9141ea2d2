//! Integration tests for the game server API
//!
//! Each test builds a router over a scratch database seeded with a handful
//! of question rows, then drives it request by request.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use gtp_common::config::GameConfig;
use gtp_common::db::init_database;
use gtp_gs::{build_router, AppState};

// =============================================================================
// Test helpers
// =============================================================================

fn test_config(dir: &TempDir) -> GameConfig {
    GameConfig {
        database_path: dir.path().join("test.db"),
        static_root: dir.path().join("static"),
        ..GameConfig::default()
    }
}

async fn setup_app(dir: &TempDir) -> (axum::Router, SqlitePool) {
    let config = test_config(dir);
    let pool = init_database(&config.database_path).await.unwrap();
    let state = AppState::new(pool.clone(), config);
    (build_router(state), pool)
}

/// Insert a question row the way the offline pipeline would write it.
async fn insert_question(
    pool: &SqlitePool,
    player_id: &str,
    player_name: &str,
    market_value: f64,
    clubs: &[&str],
    shared_by: i64,
) {
    let stints: Vec<Value> = clubs
        .iter()
        .enumerate()
        .map(|(i, club)| {
            json!({
                "club": club,
                "logo": format!("https://img.example/wappen/head/{}.png", i + 1),
                "season": "10/11",
            })
        })
        .collect();
    let difficulty = match clubs.len() {
        0..=4 => "short",
        5..=7 => "moderate",
        _ => "long",
    };

    sqlx::query(
        "INSERT INTO questions
         (player_id, player_name, market_value, stint_count, shared_by,
          difficulty, sequence_key, stints_json)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(player_id)
    .bind(player_name)
    .bind(market_value)
    .bind(clubs.len() as i64)
    .bind(shared_by)
    .bind(difficulty)
    .bind(clubs.join(" → "))
    .bind(serde_json::to_string(&stints).unwrap())
    .execute(pool)
    .await
    .unwrap();
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Banner and health
// =============================================================================

#[tokio::test]
async fn root_reports_name_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Guess the Player API");
    assert_eq!(body["status"], "running");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn health_reports_database_connectivity() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

// =============================================================================
// Random questions
// =============================================================================

#[tokio::test]
async fn random_question_hides_the_answer() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Andrea Pirlo", 30.0, &["Brescia", "Inter", "Milan", "Juventus"], 1).await;

    let response = app.oneshot(get("/game/question/short")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["player_id"], "p1");
    assert_eq!(body["difficulty"], "short");
    assert_eq!(body["stint_count"], 4);
    assert_eq!(body["shared_by"], 1);
    assert!(body.get("player_name").is_none());

    let stints = body["stints"].as_array().unwrap();
    assert_eq!(stints.len(), 4);
    assert_eq!(stints[0]["club"], "Brescia");
    assert_eq!(stints[0]["season"], "10/11");
    // No local crest cached, so the scraped URL passes through
    assert_eq!(stints[0]["logo"], "https://img.example/wappen/head/1.png");
}

#[tokio::test]
async fn unknown_difficulty_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app.oneshot(get("/game/question/extreme")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("extreme"));
}

#[tokio::test]
async fn empty_pool_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app.oneshot(get("/game/question/short")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_top_n_is_capped_not_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Andrea Pirlo", 30.0, &["Brescia", "Inter"], 1).await;

    let response = app
        .oneshot(get("/game/question/short?top_n=10000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn top_n_one_restricts_to_the_most_valuable_player() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "cheap", "Journeyman", 5.0, &["Club A", "Club B"], 1).await;
    insert_question(&pool, "star", "Superstar", 120.0, &["Club C", "Club D"], 1).await;

    // With a window of one, only the most valuable player can be drawn.
    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(get("/game/question/short?top_n=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["player_id"], "star");
    }
}

// =============================================================================
// Stateless guessing
// =============================================================================

#[tokio::test]
async fn exact_guess_scores_one_hundred() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Andrea Pirlo", 30.0, &["Brescia", "Inter"], 1).await;

    let response = app
        .oneshot(post_json(
            "/game/guess",
            json!({"player_id": "p1", "guess": "andrea pirlo"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["correct"], true);
    assert_eq!(body["similarity_score"], 100);
    assert_eq!(body["actual_answer"], "Andrea Pirlo");

    let answers = body["all_possible_answers"].as_array().unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0]["name"], "Andrea Pirlo");
    // No local portrait cached and no external source for players
    assert_eq!(
        answers[0]["image_url"],
        "/static/images/placeholders/default-player.png"
    );
}

#[tokio::test]
async fn any_player_sharing_the_sequence_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Andrea Pirlo", 30.0, &["Inter", "Milan"], 2).await;
    insert_question(&pool, "p2", "Gennaro Gattuso", 20.0, &["Inter", "Milan"], 2).await;

    let response = app
        .oneshot(post_json(
            "/game/guess",
            json!({"player_id": "p1", "guess": "Gennaro Gattuso"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["correct"], true);
    assert_eq!(body["similarity_score"], 100);
    // The canonical answer is still the asked-about player
    assert_eq!(body["actual_answer"], "Andrea Pirlo");
    assert_eq!(body["all_possible_answers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn near_and_far_guesses_split_at_the_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Zlatan Ibrahimović", 60.0, &["Ajax", "Juventus"], 1).await;

    // A single missing accent stays above the default threshold of 85
    let response = app
        .clone()
        .oneshot(post_json(
            "/game/guess",
            json!({"player_id": "p1", "guess": "Zlatan Ibrahimovic"}),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["correct"], true);
    assert!(body["similarity_score"].as_u64().unwrap() >= 85);

    let response = app
        .oneshot(post_json(
            "/game/guess",
            json!({"player_id": "p1", "guess": "Lionel Messi"}),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["correct"], false);
    assert!(body["similarity_score"].as_u64().unwrap() < 85);
}

#[tokio::test]
async fn guess_with_no_usable_characters_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Andrea Pirlo", 30.0, &["Brescia", "Inter"], 1).await;

    let response = app
        .oneshot(post_json(
            "/game/guess",
            json!({"player_id": "p1", "guess": "!!! ???"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn guess_for_unknown_player_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app
        .oneshot(post_json(
            "/game/guess",
            json!({"player_id": "ghost", "guess": "Anyone"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Stats
// =============================================================================

#[tokio::test]
async fn stats_cover_every_difficulty_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Player One", 10.0, &["A", "B"], 1).await;
    insert_question(&pool, "p2", "Player Two", 20.0, &["C", "D", "E", "F"], 1).await;
    insert_question(
        &pool,
        "p3",
        "Player Three",
        30.0,
        &["G", "H", "I", "J", "K", "L", "M", "N"],
        1,
    )
    .await;

    let response = app.oneshot(get("/game/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_questions"], 3);

    let tiers = body["by_difficulty"].as_array().unwrap();
    assert_eq!(tiers.len(), 3);
    assert_eq!(tiers[0]["difficulty"], "short");
    assert_eq!(tiers[0]["count"], 2);
    assert_eq!(tiers[0]["avg_stints"], 3.0);
    assert_eq!(tiers[0]["min_stints"], 2);
    assert_eq!(tiers[0]["max_stints"], 4);
    assert_eq!(tiers[1]["difficulty"], "moderate");
    assert_eq!(tiers[1]["count"], 0);
    assert_eq!(tiers[2]["difficulty"], "long");
    assert_eq!(tiers[2]["count"], 1);
    assert_eq!(tiers[2]["min_stints"], 8);
}

// =============================================================================
// Player lookup
// =============================================================================

#[tokio::test]
async fn lookup_tolerates_small_typos() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Messi", 100.0, &["Barcelona", "PSG"], 1).await;

    let response = app.oneshot(get("/player/Mesi")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["player_id"], "p1");
    assert_eq!(body["player_name"], "Messi");
    assert_eq!(body["stint_count"], 2);
    assert_eq!(body["difficulty"], "short");
    assert_eq!(body["stints"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn lookup_below_threshold_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Messi", 100.0, &["Barcelona", "PSG"], 1).await;

    let response = app.oneshot(get("/player/Quaresma")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Session flow
// =============================================================================

#[tokio::test]
async fn full_session_flow() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Andrea Pirlo", 30.0, &["Brescia", "Inter"], 1).await;

    // Start
    let response = app
        .clone()
        .oneshot(post_json(
            "/session/start",
            json!({"difficulty": "short", "top_n": 5000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert_eq!(body["score"], 0);
    assert_eq!(body["total_attempts"], 0);
    assert_eq!(body["question"]["player_id"], "p1");
    assert!(body["question"].get("player_name").is_none());

    // Correct guess
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/session/{session_id}/guess"),
            json!({"guess": "Andrea Pirlo"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["correct"], true);
    assert_eq!(body["session_score"], 1);
    assert_eq!(body["total_attempts"], 1);

    // Status reflects the guess but never exposes the current player
    let response = app
        .clone()
        .oneshot(get(&format!("/session/{session_id}/status")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["score"], 1);
    assert_eq!(body["total_attempts"], 1);
    assert_eq!(body["correct_guesses"], 1);
    assert!(body.get("current_question_player_id").is_none());

    // Next question keeps the score
    let response = app
        .clone()
        .oneshot(post_json(&format!("/session/{session_id}/next"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["session_score"], 1);
    assert_eq!(body["question"]["player_id"], "p1");

    // End reports the final line and deletes the session
    let response = app
        .clone()
        .oneshot(delete(&format!("/session/{session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["final_score"], 1);
    assert_eq!(body["total_attempts"], 1);
    assert_eq!(body["correct_guesses"], 1);
    assert_eq!(body["accuracy"], 100.0);
    assert_eq!(body["difficulty"], "short");
    let duration = body["duration"].as_str().unwrap();
    assert!(duration.contains("m ") && duration.ends_with('s'));

    // Gone afterwards
    let response = app
        .oneshot(get(&format!("/session/{session_id}/status")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_guess_is_evaluated_against_its_own_question() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Andrea Pirlo", 30.0, &["Brescia", "Inter"], 1).await;
    insert_question(
        &pool,
        "p2",
        "Gianluigi Buffon",
        40.0,
        &["Parma", "Juventus", "PSG", "Juventus FC", "Parma Calcio", "Carrarese"],
        1,
    )
    .await;

    // Only one short question exists, so the session's target is p1.
    let response = app
        .clone()
        .oneshot(post_json("/session/start", json!({"difficulty": "short"})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Naming the moderate player does not help; the session scores against p1.
    let response = app
        .oneshot(post_json(
            &format!("/session/{session_id}/guess"),
            json!({"guess": "Gianluigi Buffon"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["correct"], false);
    assert_eq!(body["actual_answer"], "Andrea Pirlo");
}

#[tokio::test]
async fn session_overrides_are_sticky() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "s1", "Short Player", 10.0, &["A", "B", "C"], 1).await;
    insert_question(
        &pool,
        "l1",
        "Long Player",
        20.0,
        &["D", "E", "F", "G", "H", "I", "J", "K"],
        1,
    )
    .await;

    let response = app
        .clone()
        .oneshot(post_json("/session/start", json!({"difficulty": "short"})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert_eq!(body["question"]["stint_count"], 3);

    // Override to long for this advance...
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/session/{session_id}/next"),
            json!({"difficulty": "long"}),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["question"]["stint_count"], 8);

    // ...and it sticks for the next one too.
    let response = app
        .oneshot(post_json(&format!("/session/{session_id}/next"), json!({})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["question"]["stint_count"], 8);
}

#[tokio::test]
async fn session_and_stateless_guessing_agree() {
    let dir = tempfile::tempdir().unwrap();
    let (app, pool) = setup_app(&dir).await;
    insert_question(&pool, "p1", "Messi", 100.0, &["Barcelona", "PSG"], 1).await;

    let response = app
        .clone()
        .oneshot(post_json("/session/start", json!({"difficulty": "short"})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/session/{session_id}/guess"),
            json!({"guess": "Mesi"}),
        ))
        .await
        .unwrap();
    let session_body = extract_json(response.into_body()).await;

    let response = app
        .oneshot(post_json(
            "/game/guess",
            json!({"player_id": "p1", "guess": "Mesi"}),
        ))
        .await
        .unwrap();
    let stateless_body = extract_json(response.into_body()).await;

    assert_eq!(
        session_body["similarity_score"],
        stateless_body["similarity_score"]
    );
    assert_eq!(session_body["correct"], stateless_body["correct"]);
}

#[tokio::test]
async fn malformed_session_id_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app
        .oneshot(post_json(
            "/session/not-a-uuid/guess",
            json!({"guess": "Anyone"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app
        .oneshot(post_json(
            "/session/550e8400-e29b-41d4-a716-446655440000/guess",
            json!({"guess": "Anyone"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_start_with_unknown_difficulty_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let response = app
        .oneshot(post_json(
            "/session/start",
            json!({"difficulty": "impossible"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Static file serving
// =============================================================================

#[tokio::test]
async fn cached_images_are_served_under_static() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _pool) = setup_app(&dir).await;

    let players_dir = dir.path().join("static").join("images").join("players");
    std::fs::create_dir_all(&players_dir).unwrap();
    std::fs::write(players_dir.join("28003.jpg"), b"jpeg bytes").unwrap();

    let response = app
        .clone()
        .oneshot(get("/static/images/players/28003.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/static/images/players/missing.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
