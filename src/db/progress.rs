//! # 하루 진행 기록 데이터베이스 쿼리 모듈
//!
//! `daily_progress` 테이블의 생성, 누적, 완료 전환, 조회 쿼리들입니다.
//!
//! ## 기록 라이프사이클
//! ```text
//! [그날 첫 집중 세션] insert_if_absent() → 누적(add_minutes) … → mark_completed() → [완료, 이후 되돌아가지 않음]
//! ```
//!
//! `(owner_id, goal_id, date)`에 UNIQUE 제약이 있으므로 같은 날 기록은 하나뿐입니다.
//! 두 요청이 동시에 첫 기록을 만들려고 하면 한쪽은 `ON CONFLICT DO NOTHING`으로 조용히 넘어가고,
//! 이어지는 조회에서 이미 만들어진 행을 읽습니다.

use std::collections::HashSet;

use crate::error::AppError;
use crate::models::*;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

const PROGRESS_COLUMNS: &str = r#"
    id, owner_id, goal_id, date, minutes_completed, target_minutes, is_completed, coins_earned
"#;

/// 그날의 기록이 없을 때만 새로 만듭니다.
///
/// ## 반환값
/// - `Ok(true)`: 새 기록을 만듦
/// - `Ok(false)`: 이미 기록이 있어 아무것도 하지 않음 (중복 키)
pub async fn insert_if_absent(
    executor: impl SqliteExecutor<'_>,
    owner_id: &str,
    goal_id: &str,
    date: NaiveDate,
    target_minutes: i64,
) -> Result<bool, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO daily_progress (id, owner_id, goal_id, date, target_minutes)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (owner_id, goal_id, date) DO NOTHING
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(goal_id)
    .bind(date)
    .bind(target_minutes)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// (소유자, 목표, 날짜)의 기록 하나를 조회합니다.
pub async fn find_for_day(
    executor: impl SqliteExecutor<'_>,
    owner_id: &str,
    goal_id: &str,
    date: NaiveDate,
) -> Result<Option<DailyProgress>, AppError> {
    let sql = format!(
        "SELECT {PROGRESS_COLUMNS} FROM daily_progress WHERE owner_id = ? AND goal_id = ? AND date = ?"
    );
    let record = sqlx::query_as::<_, DailyProgress>(&sql)
        .bind(owner_id)
        .bind(goal_id)
        .bind(date)
        .fetch_optional(executor)
        .await?;

    Ok(record)
}

/// 목표가 해당 날짜에 완료되었는지 확인합니다.
pub async fn is_completed_on(
    executor: impl SqliteExecutor<'_>,
    goal_id: &str,
    date: NaiveDate,
) -> Result<bool, AppError> {
    let found = sqlx::query_as::<_, (i64,)>(
        "SELECT 1 FROM daily_progress WHERE goal_id = ? AND date = ? AND is_completed = 1",
    )
    .bind(goal_id)
    .bind(date)
    .fetch_optional(executor)
    .await?;

    Ok(found.is_some())
}

/// 해당 날짜에 완료 기록이 있는 목표 ID 집합. 야간 점검이 한 번에 읽습니다.
pub async fn completed_goal_ids_on(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<HashSet<String>, AppError> {
    let rows = sqlx::query_as::<_, (String,)>(
        "SELECT goal_id FROM daily_progress WHERE date = ? AND is_completed = 1",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(goal_id,)| goal_id).collect())
}

/// 누적 시간을 원자적으로 더합니다. (읽은 값에 더해 덮어쓰지 않음)
pub async fn add_minutes(
    executor: impl SqliteExecutor<'_>,
    id: &str,
    minutes: i64,
) -> Result<(), AppError> {
    sqlx::query("UPDATE daily_progress SET minutes_completed = minutes_completed + ? WHERE id = ?")
        .bind(minutes)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

/// 완료 플래그를 한 번만 세우고 보상 코인을 기록합니다.
///
/// `AND is_completed = 0` 조건 덕분에 이미 완료된 기록에는 적용되지 않습니다.
/// 0행이 바뀌었다면 다른 요청이 먼저 완료시킨 것이므로 호출자는 충돌로 처리합니다.
pub async fn mark_completed(
    executor: impl SqliteExecutor<'_>,
    id: &str,
    coins_earned: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE daily_progress
        SET is_completed = 1,
            coins_earned = ?
        WHERE id = ? AND is_completed = 0
        "#,
    )
    .bind(coins_earned)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// 소유자의 특정 날짜 기록 전체
pub async fn list_for_owner_on(
    pool: &SqlitePool,
    owner_id: &str,
    date: NaiveDate,
) -> Result<Vec<DailyProgress>, AppError> {
    let sql = format!(
        "SELECT {PROGRESS_COLUMNS} FROM daily_progress WHERE owner_id = ? AND date = ? ORDER BY goal_id"
    );
    let records = sqlx::query_as::<_, DailyProgress>(&sql)
        .bind(owner_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

/// 목표 하나의 기록을 최신 날짜순으로 최대 `limit`개 조회합니다.
///
/// `(? IS NULL OR date >= ?)`: 범위 값이 없으면 조건 자체를 무시하는 패턴입니다.
pub async fn list_for_goal(
    pool: &SqlitePool,
    owner_id: &str,
    goal_id: &str,
    range: &DateRangeQuery,
    limit: i64,
) -> Result<Vec<DailyProgress>, AppError> {
    let sql = format!(
        r#"
        SELECT {PROGRESS_COLUMNS}
        FROM daily_progress
        WHERE owner_id = ? AND goal_id = ?
          AND (? IS NULL OR date >= ?)
          AND (? IS NULL OR date <= ?)
        ORDER BY date DESC
        LIMIT ?
        "#
    );
    let records = sqlx::query_as::<_, DailyProgress>(&sql)
        .bind(owner_id)
        .bind(goal_id)
        .bind(range.start_date)
        .bind(range.start_date)
        .bind(range.end_date)
        .bind(range.end_date)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

/// 완료된 기록을 목표 이름과 함께 최신 날짜순으로 조회합니다 (달력 화면).
pub async fn list_completed_with_goal_names(
    pool: &SqlitePool,
    owner_id: &str,
    range: &DateRangeQuery,
) -> Result<Vec<CalendarEntry>, AppError> {
    let entries = sqlx::query_as::<_, CalendarEntry>(
        r#"
        SELECT p.date, p.goal_id, g.name AS goal_name, p.minutes_completed, p.coins_earned
        FROM daily_progress p
        JOIN goals g ON g.id = p.goal_id
        WHERE p.owner_id = ? AND p.is_completed = 1
          AND (? IS NULL OR p.date >= ?)
          AND (? IS NULL OR p.date <= ?)
        ORDER BY p.date DESC, g.name
        "#,
    )
    .bind(owner_id)
    .bind(range.start_date)
    .bind(range.start_date)
    .bind(range.end_date)
    .bind(range.end_date)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// 기간 안의 완료 기록 수 (양 끝 포함)
pub async fn count_completed_between(
    pool: &SqlitePool,
    owner_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<i64, AppError> {
    let (count,) = sqlx::query_as::<_, (i64,)>(
        r#"
        SELECT COUNT(*)
        FROM daily_progress
        WHERE owner_id = ? AND is_completed = 1 AND date >= ? AND date <= ?
        "#,
    )
    .bind(owner_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
