//! # 세션 API 라우트 핸들러
//!
//! 타이머 구간이 끝날 때 세션을 기록하고, 이력과 통계를 조회하는 HTTP 핸들러입니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | POST | /api/v1/sessions | `create_session` | 세션 기록 (진행/스트릭/보상 갱신) |
//! | GET | /api/v1/sessions | `list_sessions` | 세션 이력 |
//! | GET | /api/v1/sessions/stats | `session_stats` | 최근 기간 집중 통계 |
//! | PATCH | /api/v1/sessions/{id} | `update_session_notes` | 메모 수정 |
//!
//! ## 세션 사용 흐름
//! ```text
//! 1. 타이머 집중 구간 종료 → POST /sessions { goal_id, duration_minutes: 25 }
//! 2. 휴식 구간 종료       → POST /sessions { ..., session_type: "break" }
//! 3. 기록 화면            → GET /sessions?goal_id=...
//! ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::recorder,
};

/// 이력 조회 기본/최대 개수
const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// 세션을 기록합니다.
///
/// `POST /api/v1/sessions`
/// + `{ "goal_id": "...", "duration_minutes": 25, "session_type": "focus", "notes": "..." }`
///
/// 기록 작업은 별도 태스크에서 실행합니다. 클라이언트가 요청 도중 연결을 끊어도
/// 핸들러 future와 함께 취소되지 않고 트랜잭션이 커밋 또는 롤백까지 진행됩니다.
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<RecordedSession>), AppError> {
    let pool = state.pool.clone();
    let config = state.recorder;
    let owner_id = auth.owner_id;

    let recorded = tokio::spawn(async move {
        recorder::record_session(&pool, config, &owner_id, &req, Utc::now()).await
    })
    .await
    .map_err(|e| AppError::Internal(format!("session recording task failed: {e}")))??;

    Ok((StatusCode::CREATED, Json(recorded)))
}

/// 세션 이력을 최신순으로 조회합니다.
///
/// `GET /api/v1/sessions?goal_id=...&start=2026-01-01T00:00:00Z&end=...&limit=50`
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<Session>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let sessions = db::sessions::list_sessions(
        &state.pool,
        &auth.owner_id,
        query.goal_id.as_deref(),
        query.start,
        query.end,
        limit,
    )
    .await?;

    Ok(Json(sessions))
}

/// 최근 `period`일 동안의 집중 세션 통계
///
/// `GET /api/v1/sessions/stats?period=30`
pub async fn session_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SessionStatsQuery>,
) -> Result<Json<SessionStats>, AppError> {
    let period = query.period.unwrap_or(30);
    if !(1..=3650).contains(&period) {
        return Err(AppError::Validation(
            "period must be between 1 and 3650 days".to_string(),
        ));
    }

    let since = Utc::now() - Duration::days(period);
    let (total_minutes, total_sessions) =
        db::sessions::focus_totals_since(&state.pool, &auth.owner_id, since).await?;

    // 반올림 평균: (합 + 개수/2) / 개수
    let average_session_length = if total_sessions > 0 {
        (total_minutes + total_sessions / 2) / total_sessions
    } else {
        0
    };

    Ok(Json(SessionStats {
        total_minutes,
        total_sessions,
        average_session_length,
        period,
    }))
}

/// 세션 메모를 수정합니다. 메모는 500자로 잘립니다.
///
/// `PATCH /api/v1/sessions/{id}` + `{ "notes": "..." }`
/// `notes`가 없으면 아무것도 바꾸지 않고 현재 세션을 돌려줍니다.
pub async fn update_session_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<Session>, AppError> {
    let session = match req.notes {
        Some(notes) => {
            db::sessions::update_notes(&state.pool, &auth.owner_id, &id, &truncate_notes(&notes))
                .await?
        }
        None => db::sessions::get_session(&state.pool, &auth.owner_id, &id).await?,
    };

    Ok(Json(session.ok_or(AppError::NotFound)?))
}
