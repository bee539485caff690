//! # 세션 데이터베이스 쿼리 모듈
//!
//! 집중/휴식 세션의 기록, 조회, 메모 수정, 통계 쿼리 함수들입니다.
//!
//! ## 세션 라이프사이클
//! ```text
//! [타이머 구간 종료] create_session() → [불변 기록] → (선택) update_notes()
//! ```
//!
//! 세션 행은 진행 기록/스트릭 트랜잭션과 별도로 먼저 커밋됩니다.
//! 이후 단계가 실패해도 세션 자체는 남습니다.

use crate::error::AppError;
use crate::models::*;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

const SESSION_COLUMNS: &str = r#"
    id, owner_id, goal_id, duration_minutes, session_type, notes, completed_at
"#;

/// 새 세션을 저장하고 저장된 행을 반환합니다.
///
/// ## 매개변수
/// - `completed_at`: 세션이 끝난 시각 — 하루 경계 계산에도 같은 값을 씁니다
/// - `notes`: 이미 500자로 잘린 메모
pub async fn create_session(
    executor: impl SqliteExecutor<'_>,
    owner_id: &str,
    goal_id: &str,
    duration_minutes: i64,
    session_type: SessionType,
    notes: &str,
    completed_at: DateTime<Utc>,
) -> Result<Session, AppError> {
    // UUIDv7으로 세션 ID를 생성합니다
    let id = uuid::Uuid::now_v7().to_string();

    // RETURNING: INSERT한 행을 그대로 돌려받아 다시 조회하지 않아도 됩니다.
    let sql = format!(
        r#"
        INSERT INTO sessions (id, owner_id, goal_id, duration_minutes, session_type, notes, completed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {SESSION_COLUMNS}
        "#
    );
    let session = sqlx::query_as::<_, Session>(&sql)
        .bind(&id)
        .bind(owner_id)
        .bind(goal_id)
        .bind(duration_minutes)
        .bind(session_type)
        .bind(notes)
        .bind(completed_at)
        .fetch_one(executor)
        .await?;

    Ok(session)
}

/// ID로 소유자의 세션 하나를 조회합니다.
pub async fn get_session(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
) -> Result<Option<Session>, AppError> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ? AND owner_id = ?");
    let session = sqlx::query_as::<_, Session>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

    Ok(session)
}

/// 세션 메모를 수정합니다. 세션에서 유일하게 바꿀 수 있는 필드입니다.
///
/// ## 반환값
/// - `Ok(Some(Session))`: 수정 성공
/// - `Ok(None)`: 세션이 없거나 소유자가 다름
pub async fn update_notes(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    notes: &str,
) -> Result<Option<Session>, AppError> {
    let result = sqlx::query("UPDATE sessions SET notes = ? WHERE id = ? AND owner_id = ?")
        .bind(notes)
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_session(pool, owner_id, id).await
}

/// 소유자의 세션 이력을 최신순으로 조회합니다.
///
/// 목표와 기간 조건은 선택이며, 값이 없으면 `? IS NULL`로 조건을 건너뜁니다.
pub async fn list_sessions(
    pool: &SqlitePool,
    owner_id: &str,
    goal_id: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<Session>, AppError> {
    let sql = format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM sessions
        WHERE owner_id = ?
          AND (? IS NULL OR goal_id = ?)
          AND (? IS NULL OR completed_at >= ?)
          AND (? IS NULL OR completed_at <= ?)
        ORDER BY completed_at DESC, id DESC
        LIMIT ?
        "#
    );
    let sessions = sqlx::query_as::<_, Session>(&sql)
        .bind(owner_id)
        .bind(goal_id)
        .bind(goal_id)
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(end)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(sessions)
}

/// `since` 이후 집중 세션의 (총 시간, 세션 수)
pub async fn focus_totals_since(
    pool: &SqlitePool,
    owner_id: &str,
    since: DateTime<Utc>,
) -> Result<(i64, i64), AppError> {
    let totals = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT COALESCE(SUM(duration_minutes), 0), COUNT(*)
        FROM sessions
        WHERE owner_id = ? AND session_type = 'focus' AND completed_at >= ?
        "#,
    )
    .bind(owner_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(totals)
}
