//! # 하루 진행 기록(DailyProgress) 모델 정의
//!
//! 목표 하나의 하루치 집중 시간 누적과 완료 여부를 담습니다.
//! `(owner_id, goal_id, date)`당 최대 한 행이며, `is_completed`는
//! false → true로 한 번만 바뀌고 되돌아가지 않습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 하루 진행 기록 — DB의 `daily_progress` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyProgress {
    pub id: String,
    pub owner_id: String,
    pub goal_id: String,
    /// 설정된 오프셋 기준의 달력 날짜
    pub date: NaiveDate,
    /// 오늘 누적된 집중 시간 (분)
    pub minutes_completed: i64,
    /// 그날 첫 세션 시점의 목표 시간 스냅샷 — 이후 목표 수정과 무관
    pub target_minutes: i64,
    pub is_completed: bool,
    /// 완료되는 순간 한 번 정해지는 보상 코인
    pub coins_earned: i64,
}

/// 날짜 범위 쿼리 — `?start_date=2026-01-01&end_date=2026-01-31`
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// 단일 날짜 쿼리 — `?date=2026-01-01` (없으면 오늘)
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

/// 달력 화면용 완료 항목 — 완료된 진행 기록과 목표 이름을 조인한 결과
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CalendarEntry {
    #[serde(skip_serializing)]
    pub date: NaiveDate,
    pub goal_id: String,
    pub goal_name: String,
    pub minutes_completed: i64,
    pub coins_earned: i64,
}

/// 활성 목표 전체에 대한 요약 통계
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub total_active_goals: i64,
    /// 활성 목표들의 현재 스트릭 합계
    pub total_streak_days: i64,
    pub longest_streak: i64,
    pub total_minutes: i64,
    pub total_sessions: i64,
    /// 이번 달에 완료된 (목표, 날짜) 기록 수
    pub this_month_completed_days: i64,
}
