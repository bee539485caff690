//! # 야간 점검 실행 기록
//!
//! 점검이 날짜마다 한 번만 돌도록 "이 날짜에 이미 실행했는가"만 저장합니다.
//! 코인 차감은 멱등이 아니므로 재시작 후 같은 날짜로 다시 돌리면 안 됩니다.

use crate::error::AppError;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// 해당 날짜의 점검이 이미 기록되어 있는지 확인합니다.
pub async fn has_run(pool: &SqlitePool, run_date: NaiveDate) -> Result<bool, AppError> {
    let found = sqlx::query_as::<_, (i64,)>("SELECT 1 FROM sweep_runs WHERE run_date = ?")
        .bind(run_date)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}

/// 점검 실행을 기록합니다. 이미 기록이 있으면 false를 반환합니다.
pub async fn record_run(pool: &SqlitePool, run_date: NaiveDate) -> Result<bool, AppError> {
    let result = sqlx::query("INSERT OR IGNORE INTO sweep_runs (run_date) VALUES (?)")
        .bind(run_date)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
