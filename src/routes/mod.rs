//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! 핸들러는 얇게 유지하고, 규칙은 `services`에, SQL은 `db`에 둡니다.
//!
//! 각 하위 모듈:
//! - `goals`: 목표 CRUD와 목표별 통계
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `progress`: 하루 진행 기록, 달력, 전체 통계
//! - `sessions`: 세션 기록(핵심 연산), 이력, 메모 수정
//! - `users`: 내 코인/랭크 조회

pub mod goals;
pub mod health;
pub mod progress;
pub mod sessions;
pub mod users;

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::SqlitePool;

use crate::services::recorder::RecorderConfig;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// SqlitePool은 내부적으로 Arc를 쓰므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 검증용 비밀키
    pub jwt_secret: String,
    /// 세션 기록기 설정 (날짜 경계 오프셋, 재시도 횟수)
    pub recorder: RecorderConfig,
}

/// `/api/v1` 아래에 들어갈 모든 API 라우트
///
/// main.rs와 통합 테스트가 같은 라우터를 사용합니다.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // 세션 API (핵심: POST /sessions)
        .route("/sessions", post(sessions::create_session).get(sessions::list_sessions))
        .route("/sessions/stats", get(sessions::session_stats))
        .route("/sessions/{id}", patch(sessions::update_session_notes))
        // 목표 CRUD API
        .route("/goals", get(goals::list_goals).post(goals::create_goal))
        .route(
            "/goals/{id}",
            get(goals::get_goal).patch(goals::update_goal).delete(goals::delete_goal),
        )
        .route("/goals/{id}/stats", get(goals::goal_stats))
        // 진행 기록 조회 API
        .route("/progress/daily", get(progress::daily_progress))
        .route("/progress/goal/{goal_id}", get(progress::goal_progress))
        .route("/progress/calendar", get(progress::calendar))
        .route("/progress/stats/overall", get(progress::overall_stats))
        // 사용자 보상 정보
        .route("/users/me", get(users::me))
        .route("/health", get(health::health_check))
        .with_state(state)
}
