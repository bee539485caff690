//! # 목표 데이터베이스 쿼리 모듈
//!
//! 목표 CRUD와 세션 기록기/야간 점검이 사용하는 스트릭·카운터 갱신 쿼리입니다.
//!
//! 소유권 확인은 SQL에서 합니다: 조회·수정 쿼리는 모두 `owner_id = ?` 조건을 포함하므로
//! 다른 사용자의 목표는 "존재하지 않는 목표"와 똑같이 `None`으로 돌아옵니다.
//!
//! 트랜잭션 안에서도 쓰이는 함수는 `impl SqliteExecutor`를 받습니다.
//! `&SqlitePool`과 `&mut SqliteConnection`(트랜잭션) 모두 넘길 수 있습니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

/// `SELECT` 절에서 공통으로 쓰는 목표 컬럼 목록
const GOAL_COLUMNS: &str = r#"
    id, owner_id, name, description, daily_target_minutes, category,
    is_active, skip_break, current_streak, longest_streak, last_completed_date,
    total_sessions_completed, total_minutes_completed, created_at, updated_at
"#;

/// 새 목표를 생성합니다. 스트릭과 누적 카운터는 0에서 시작합니다.
pub async fn create_goal(
    pool: &SqlitePool,
    owner_id: &str,
    goal: &NewGoal,
) -> Result<Goal, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO goals (id, owner_id, name, description, daily_target_minutes, category, skip_break)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(&goal.name)
    .bind(&goal.description)
    .bind(goal.daily_target_minutes)
    .bind(goal.category)
    .bind(goal.skip_break)
    .execute(pool)
    .await?;

    get_goal(pool, owner_id, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created goal".to_string()))
}

/// 소유자의 목표 하나를 조회합니다. 삭제(비활성)된 목표도 조회됩니다.
pub async fn get_goal(
    executor: impl SqliteExecutor<'_>,
    owner_id: &str,
    id: &str,
) -> Result<Option<Goal>, AppError> {
    let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ? AND owner_id = ?");
    let goal = sqlx::query_as::<_, Goal>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(executor)
        .await?;

    Ok(goal)
}

/// 소유자의 활성 목표를 최신순으로 조회합니다.
pub async fn list_active_goals(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Goal>, AppError> {
    let sql = format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE owner_id = ? AND is_active = 1 ORDER BY created_at DESC, id DESC"
    );
    let goals = sqlx::query_as::<_, Goal>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

    Ok(goals)
}

/// 모든 사용자의 활성 목표를 조회합니다. 야간 점검 작업이 사용합니다.
pub async fn list_all_active_goals(pool: &SqlitePool) -> Result<Vec<Goal>, AppError> {
    let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE is_active = 1 ORDER BY id");
    let goals = sqlx::query_as::<_, Goal>(&sql).fetch_all(pool).await?;

    Ok(goals)
}

/// 목표를 부분 업데이트합니다.
///
/// `COALESCE(?, column)`: 바인딩 값이 NULL(=요청에 없음)이면 기존 값을 유지합니다.
/// 입력값 검증은 호출하는 쪽에서 끝낸 상태여야 합니다.
///
/// ## 반환값
/// - `Ok(Some(Goal))`: 업데이트 성공
/// - `Ok(None)`: 목표가 없거나 소유자가 다름
pub async fn update_goal(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    changes: &GoalChanges,
) -> Result<Option<Goal>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE goals
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            daily_target_minutes = COALESCE(?, daily_target_minutes),
            category = COALESCE(?, category),
            is_active = COALESCE(?, is_active),
            skip_break = COALESCE(?, skip_break),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(changes.daily_target_minutes)
    .bind(changes.category)
    .bind(changes.is_active)
    .bind(changes.skip_break)
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_goal(pool, owner_id, id).await
}

/// 목표를 비활성화합니다 (soft delete). 대상이 없으면 false를 반환합니다.
pub async fn deactivate_goal(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE goals
        SET is_active = 0,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// 세션 수와 누적 시간을 원자적으로 증가시키고 갱신된 목표를 반환합니다.
///
/// 세션 기록 트랜잭션의 첫 문장입니다. 쓰기로 시작하므로 SQLite 쓰기 잠금을 먼저 잡고,
/// 같은 목표에 대한 다른 기록기와 야간 점검은 이 트랜잭션이 끝날 때까지 기다립니다.
pub async fn increment_counters(
    executor: impl SqliteExecutor<'_>,
    owner_id: &str,
    id: &str,
    minutes: i64,
) -> Result<Option<Goal>, AppError> {
    let sql = format!(
        r#"
        UPDATE goals
        SET total_sessions_completed = total_sessions_completed + 1,
            total_minutes_completed = total_minutes_completed + ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND owner_id = ?
        RETURNING {GOAL_COLUMNS}
        "#
    );
    let goal = sqlx::query_as::<_, Goal>(&sql)
        .bind(minutes)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(executor)
        .await?;

    Ok(goal)
}

/// 스트릭 필드를 저장합니다.
pub async fn save_streak(executor: impl SqliteExecutor<'_>, goal: &Goal) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE goals
        SET current_streak = ?,
            longest_streak = ?,
            last_completed_date = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(goal.current_streak)
    .bind(goal.longest_streak)
    .bind(goal.last_completed_date)
    .bind(&goal.id)
    .execute(executor)
    .await?;

    Ok(())
}

/// 소유자의 활성 목표 중 최장 스트릭. 목표가 없으면 0입니다.
pub async fn max_longest_streak(
    executor: impl SqliteExecutor<'_>,
    owner_id: &str,
) -> Result<i64, AppError> {
    let (max,) = sqlx::query_as::<_, (i64,)>(
        "SELECT COALESCE(MAX(longest_streak), 0) FROM goals WHERE owner_id = ? AND is_active = 1",
    )
    .bind(owner_id)
    .fetch_one(executor)
    .await?;

    Ok(max)
}
