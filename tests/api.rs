//! HTTP-level integration tests.
//!
//! Requests go straight to the router through `tower::ServiceExt::oneshot`,
//! authenticated with tokens minted from the test secret.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, create_goal, send};
use serde_json::json;
use sqlx::SqlitePool;

const OWNER: &str = "owner-1";

#[sqlx::test(migrations = "./migrations")]
async fn health_needs_no_token(pool: SqlitePool) {
    let response = send(build_test_app(pool), Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[sqlx::test(migrations = "./migrations")]
async fn requests_without_token_are_rejected(pool: SqlitePool) {
    let response = send(build_test_app(pool), Method::GET, "/api/v1/goals", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "unauthorized");
}

#[sqlx::test(migrations = "./migrations")]
async fn recording_a_session_rewards_the_user(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/goals",
        Some(OWNER),
        Some(json!({ "name": "Read", "daily_target_minutes": 20, "category": "learning" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let goal = body_json(response).await;
    let goal_id = goal["id"].as_str().unwrap().to_string();

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/sessions",
        Some(OWNER),
        Some(json!({ "goal_id": goal_id, "duration_minutes": 25, "notes": "chapter 3" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let recorded = body_json(response).await;
    assert_eq!(recorded["session"]["session_type"], "focus");
    assert_eq!(recorded["progress"]["is_completed"], true);
    assert_eq!(recorded["goal"]["current_streak"], 1);

    let response = send(app, Method::GET, "/api/v1/users/me", Some(OWNER), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["total_coins"], 10);
    assert_eq!(me["rank"], "Novice");
}

#[sqlx::test(migrations = "./migrations")]
async fn invalid_goal_target_is_a_validation_error(pool: SqlitePool) {
    let response = send(
        build_test_app(pool),
        Method::POST,
        "/api/v1/goals",
        Some(OWNER),
        Some(json!({ "name": "Too short", "daily_target_minutes": 5 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "./migrations")]
async fn session_longer_than_a_day_is_a_bad_request(pool: SqlitePool) {
    let goal = create_goal(&pool, OWNER, 30).await;
    let response = send(
        build_test_app(pool),
        Method::POST,
        "/api/v1/sessions",
        Some(OWNER),
        Some(json!({ "goal_id": goal.id, "duration_minutes": i64::MAX })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "./migrations")]
async fn goals_are_private_to_their_owner(pool: SqlitePool) {
    let goal = create_goal(&pool, OWNER, 30).await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/goals/{}", goal.id);
    let response = send(app.clone(), Method::GET, &uri, Some("someone-else"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        app,
        Method::POST,
        "/api/v1/sessions",
        Some("someone-else"),
        Some(json!({ "goal_id": goal.id, "duration_minutes": 30 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleted_goal_disappears_from_list(pool: SqlitePool) {
    let goal = create_goal(&pool, OWNER, 30).await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/goals/{}", goal.id);
    let response = send(app.clone(), Method::DELETE, &uri, Some(OWNER), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(app.clone(), Method::GET, "/api/v1/goals", Some(OWNER), None).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let response = send(app, Method::DELETE, "/api/v1/goals/missing", Some(OWNER), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn session_stats_average_focus_sessions_only(pool: SqlitePool) {
    let goal = create_goal(&pool, OWNER, 240).await;
    let app = build_test_app(pool);

    for (minutes, kind) in [(25, "focus"), (30, "focus"), (5, "break")] {
        let response = send(
            app.clone(),
            Method::POST,
            "/api/v1/sessions",
            Some(OWNER),
            Some(json!({ "goal_id": goal.id, "duration_minutes": minutes, "session_type": kind })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(app.clone(), Method::GET, "/api/v1/sessions/stats", Some(OWNER), None).await;
    let stats = body_json(response).await;
    assert_eq!(stats["total_minutes"], 55);
    assert_eq!(stats["total_sessions"], 2);
    assert_eq!(stats["average_session_length"], 28);
    assert_eq!(stats["period"], 30);

    let response = send(app, Method::GET, "/api/v1/sessions?limit=2", Some(OWNER), None).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn session_notes_are_truncated_on_update(pool: SqlitePool) {
    let goal = create_goal(&pool, OWNER, 30).await;
    let app = build_test_app(pool);

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/sessions",
        Some(OWNER),
        Some(json!({ "goal_id": goal.id, "duration_minutes": 10 })),
    )
    .await;
    let session_id = body_json(response).await["session"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let uri = format!("/api/v1/sessions/{session_id}");
    let response = send(
        app,
        Method::PATCH,
        &uri,
        Some(OWNER),
        Some(json!({ "notes": "x".repeat(600) })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let session = body_json(response).await;
    assert_eq!(session["notes"].as_str().unwrap().len(), 500);
}

#[sqlx::test(migrations = "./migrations")]
async fn completed_days_show_up_in_calendar_and_overall_stats(pool: SqlitePool) {
    let goal = create_goal(&pool, OWNER, 10).await;
    let app = build_test_app(pool);

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/sessions",
        Some(OWNER),
        Some(json!({ "goal_id": goal.id, "duration_minutes": 15 })),
    )
    .await;
    let date = body_json(response).await["progress"]["date"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(app.clone(), Method::GET, "/api/v1/progress/calendar", Some(OWNER), None).await;
    let calendar = body_json(response).await;
    let entries = calendar[&date].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["goal_name"], "Deep work");
    assert_eq!(entries[0]["coins_earned"], 10);

    let response = send(
        app,
        Method::GET,
        "/api/v1/progress/stats/overall",
        Some(OWNER),
        None,
    )
    .await;
    let stats = body_json(response).await;
    assert_eq!(stats["total_active_goals"], 1);
    assert_eq!(stats["total_streak_days"], 1);
    assert_eq!(stats["total_minutes"], 15);
    assert_eq!(stats["this_month_completed_days"], 1);
}
