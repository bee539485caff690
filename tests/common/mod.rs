#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use focusstreak::db;
use focusstreak::middleware::auth::create_access_token;
use focusstreak::models::{CreateGoalRequest, CreateSessionRequest, Goal, User};
use focusstreak::routes::{self, AppState};
use focusstreak::services::recorder::RecorderConfig;

pub const TEST_SECRET: &str = "test-secret";

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

pub fn recorder_config() -> RecorderConfig {
    RecorderConfig {
        day_offset: utc(),
        max_retries: 10,
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Noon UTC on the given day.
pub fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

/// Same router the server nests under `/api/v1`.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let state = AppState {
        pool,
        jwt_secret: TEST_SECRET.to_string(),
        recorder: recorder_config(),
    };
    Router::new().nest("/api/v1", routes::api_routes(state))
}

pub async fn create_goal(pool: &SqlitePool, owner_id: &str, target_minutes: i64) -> Goal {
    let new_goal = CreateGoalRequest {
        name: "Deep work".to_string(),
        description: None,
        daily_target_minutes: target_minutes,
        category: Some("work".to_string()),
        skip_break: None,
    }
    .validate()
    .unwrap();

    db::users::ensure_user(pool, owner_id).await.unwrap();
    db::goals::create_goal(pool, owner_id, &new_goal).await.unwrap()
}

pub fn focus(goal_id: &str, minutes: i64) -> CreateSessionRequest {
    CreateSessionRequest {
        goal_id: goal_id.to_string(),
        duration_minutes: minutes,
        session_type: None,
        notes: None,
    }
}

pub async fn user(pool: &SqlitePool, owner_id: &str) -> User {
    db::users::find_by_id(pool, owner_id).await.unwrap().unwrap()
}

pub async fn reload_goal(pool: &SqlitePool, goal: &Goal) -> Goal {
    db::goals::get_goal(pool, &goal.owner_id, &goal.id)
        .await
        .unwrap()
        .unwrap()
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub fn bearer(owner_id: &str) -> String {
    format!("Bearer {}", create_access_token(owner_id, TEST_SECRET).unwrap())
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    owner_id: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(owner_id) = owner_id {
        builder = builder.header(AUTHORIZATION, bearer(owner_id));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
