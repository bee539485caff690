//! # 진행 기록 조회 핸들러
//!
//! 진행 기록은 세션 기록기만 쓰고, 여기서는 읽기만 합니다.
//!
//! ## 엔드포인트
//! - `GET /api/v1/progress/daily?date=YYYY-MM-DD` → 그날의 목표별 기록
//! - `GET /api/v1/progress/goal/{goal_id}?start_date=&end_date=` → 목표 하나의 기록 (최대 90일)
//! - `GET /api/v1/progress/calendar?start_date=&end_date=` → 날짜별 완료 목록
//! - `GET /api/v1/progress/stats/overall` → 활성 목표 요약 통계

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::daily,
};

/// 목표별 기록 조회 최대 개수
const GOAL_PROGRESS_LIMIT: i64 = 90;

/// 그날의 진행 기록. 날짜가 없으면 설정된 오프셋 기준 오늘입니다.
pub async fn daily_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<DailyProgress>>, AppError> {
    let date = query
        .date
        .unwrap_or_else(|| daily::calendar_day(Utc::now(), state.recorder.day_offset));
    let records = db::progress::list_for_owner_on(&state.pool, &auth.owner_id, date).await?;
    Ok(Json(records))
}

/// 목표 하나의 진행 기록 (최신순, 최대 90개)
pub async fn goal_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(goal_id): Path<String>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<DailyProgress>>, AppError> {
    // 다른 사용자의 목표면 빈 배열 대신 404
    db::goals::get_goal(&state.pool, &auth.owner_id, &goal_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let records =
        db::progress::list_for_goal(&state.pool, &auth.owner_id, &goal_id, &range, GOAL_PROGRESS_LIMIT)
            .await?;
    Ok(Json(records))
}

/// 완료된 날짜별로 묶은 달력 데이터
///
/// 결과: `{ "2026-01-02": [{ goal_id, goal_name, minutes_completed, coins_earned }], ... }`
pub async fn calendar(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<BTreeMap<NaiveDate, Vec<CalendarEntry>>>, AppError> {
    let entries =
        db::progress::list_completed_with_goal_names(&state.pool, &auth.owner_id, &range).await?;

    let mut by_date: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();
    for entry in entries {
        by_date.entry(entry.date).or_default().push(entry);
    }
    Ok(Json(by_date))
}

/// 활성 목표 전체에 대한 요약 통계
pub async fn overall_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<OverallStats>, AppError> {
    let goals = db::goals::list_active_goals(&state.pool, &auth.owner_id).await?;

    let today = daily::calendar_day(Utc::now(), state.recorder.day_offset);
    let month_start = today.with_day(1).unwrap_or(today);
    let month_end = month_end(today);
    let this_month_completed_days =
        db::progress::count_completed_between(&state.pool, &auth.owner_id, month_start, month_end)
            .await?;

    Ok(Json(OverallStats {
        total_active_goals: goals.len() as i64,
        total_streak_days: goals.iter().map(|g| g.current_streak).sum(),
        longest_streak: goals.iter().map(|g| g.longest_streak).max().unwrap_or(0),
        total_minutes: goals.iter().map(|g| g.total_minutes_completed).sum(),
        total_sessions: goals.iter().map(|g| g.total_sessions_completed).sum(),
        this_month_completed_days,
    }))
}

/// 해당 날짜가 속한 달의 마지막 날
fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_end_handles_december_and_leap_years() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(month_end(d(2026, 12, 5)), d(2026, 12, 31));
        assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(month_end(d(2026, 4, 30)), d(2026, 4, 30));
    }
}
