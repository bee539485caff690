//! # 목표(Goal) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/goals`            → 활성 목표 목록
//! - `POST   /api/v1/goals`            → 새 목표 생성
//! - `GET    /api/v1/goals/{id}`       → 단일 목표 조회
//! - `PATCH  /api/v1/goals/{id}`       → 목표 수정 (부분 업데이트)
//! - `DELETE /api/v1/goals/{id}`       → 목표 비활성화 (soft delete)
//! - `GET    /api/v1/goals/{id}/stats` → 목표 + 최근 30일 진행 기록
//!
//! 스트릭과 누적 카운터는 여기서 바꿀 수 없습니다. 세션 기록과 야간 점검만 바꿉니다.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Days, Utc};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::daily,
};

/// 목표 통계에 포함할 최근 일수
const STATS_WINDOW_DAYS: u64 = 30;

/// `GET /goals` — 활성 목표 목록 (최신순)
pub async fn list_goals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Goal>>, AppError> {
    let goals = db::goals::list_active_goals(&state.pool, &auth.owner_id).await?;
    Ok(Json(goals))
}

/// `GET /goals/{id}` — 단일 목표 조회
pub async fn get_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Goal>, AppError> {
    let goal = db::goals::get_goal(&state.pool, &auth.owner_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(goal))
}

/// `POST /goals` — 새 목표를 만듭니다.
///
/// 검증 실패(이름 없음, 10~240분 범위 밖, 알 수 없는 카테고리)는 아무것도 저장하지 않고 400입니다.
pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), AppError> {
    let new_goal = req.validate()?;

    db::users::ensure_user(&state.pool, &auth.owner_id).await?;
    let goal = db::goals::create_goal(&state.pool, &auth.owner_id, &new_goal).await?;

    tracing::info!(goal_id = %goal.id, owner_id = %auth.owner_id, "Goal created");
    Ok((StatusCode::CREATED, Json(goal)))
}

/// `PATCH /goals/{id}` — 요청에 포함된 필드만 수정합니다.
pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<Goal>, AppError> {
    let changes = req.validate()?;
    let goal = db::goals::update_goal(&state.pool, &auth.owner_id, &id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(goal))
}

/// `DELETE /goals/{id}` — 목표를 비활성화합니다. 기록은 그대로 남습니다.
pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !db::goals::deactivate_goal(&state.pool, &auth.owner_id, &id).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "message": "Goal deleted successfully" })))
}

/// `GET /goals/{id}/stats` — 목표와 최근 30일 진행 기록
pub async fn goal_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let goal = db::goals::get_goal(&state.pool, &auth.owner_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let today = daily::calendar_day(Utc::now(), state.recorder.day_offset);
    let range = DateRangeQuery {
        start_date: today.checked_sub_days(Days::new(STATS_WINDOW_DAYS)),
        end_date: None,
    };
    let recent_progress =
        db::progress::list_for_goal(&state.pool, &auth.owner_id, &id, &range, STATS_WINDOW_DAYS as i64 + 1)
            .await?;

    Ok(Json(json!({
        "goal": goal,
        "recent_progress": recent_progress
    })))
}
