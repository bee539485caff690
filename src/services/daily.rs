//! # 하루 진행 기록 (DailyAggregate)
//!
//! 목표 하나의 하루치 진행을 표현하고 "오늘 목표를 달성했는가"를 판정합니다.
//! 스트릭과 보상은 여기서 결정하지 않고, 완료 전환 여부만 호출자(세션 기록기)에게 알려줍니다.
//!
//! ## 날짜 경계
//! "오늘"은 서버 로컬 시간이 아니라 설정된 고정 UTC 오프셋(`DAY_OFFSET_MINUTES`)으로 계산합니다.
//! 세션 기록과 야간 점검이 같은 `calendar_day()`를 써야 스트릭이 어긋나지 않습니다.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::SqliteConnection;

use crate::{db, error::AppError, models::DailyProgress};

/// UTC 시각을 설정된 오프셋 기준의 달력 날짜로 바꿉니다.
pub fn calendar_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// 전날. `NaiveDate::MIN`에서는 그대로 반환합니다.
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// (목표, 날짜)의 기록을 찾고, 없으면 새로 만듭니다.
///
/// `target_minutes`는 그날 첫 세션 시점의 목표 시간 스냅샷입니다.
/// 이미 기록이 있으면 스냅샷은 무시되고 기존 목표치가 유지됩니다.
///
/// 동시에 두 요청이 만들려고 하면 UNIQUE 제약에 걸린 쪽은 INSERT를 건너뛰고
/// 이미 만들어진 행을 다시 읽습니다. 요청 자체는 실패하지 않습니다.
pub async fn get_or_create(
    conn: &mut SqliteConnection,
    owner_id: &str,
    goal_id: &str,
    date: NaiveDate,
    target_minutes: i64,
) -> Result<DailyProgress, AppError> {
    let created =
        db::progress::insert_if_absent(&mut *conn, owner_id, goal_id, date, target_minutes).await?;
    if created {
        tracing::debug!(goal_id, %date, target_minutes, "Started daily progress record");
    }

    db::progress::find_for_day(&mut *conn, owner_id, goal_id, date)
        .await?
        .ok_or(AppError::Internal(
            "Failed to retrieve daily progress record".to_string(),
        ))
}

/// 누적 시간에 `minutes`를 더하고, 이번에 처음으로 목표치에 도달했는지 반환합니다.
///
/// 이미 완료된 기록이면 아무리 더해도 false입니다 (완료 전환은 하루 한 번).
/// true를 받은 호출자는 `complete()`로 완료 상태와 코인을 기록해야 합니다.
pub fn apply_minutes(record: &mut DailyProgress, minutes: i64) -> bool {
    record.minutes_completed += minutes;
    !record.is_completed && record.minutes_completed >= record.target_minutes
}

/// 완료 상태로 전환하고 그날의 보상 코인을 기록합니다.
pub fn complete(record: &mut DailyProgress, coins_earned: i64) {
    record.is_completed = true;
    record.coins_earned = coins_earned;
}
