//! # 스트릭 엔진
//!
//! 목표의 현재/최장 스트릭을 날짜 연속성에 따라 늘리거나 끊습니다.
//!
//! - `advance_on_completion`: 하루 목표를 처음 달성한 순간 호출 (목표·날짜당 최대 한 번)
//! - `penalize_for_miss`: 전날 달성하지 못한 목표에 대해 야간 점검이 호출
//!
//! 순수 함수가 결정하고, `advance`/`penalize`가 DB 조회와 저장을 감쌉니다.

use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::{db, error::AppError, models::Goal, services::daily};

/// 완료일 기준으로 스트릭을 갱신합니다.
///
/// 전날 완료 기록이 있거나 현재 스트릭이 0이면 1 증가, 그 외에는 1로 새로 시작합니다.
/// 현재 스트릭이 0보다 큰데 전날 기록이 없는 경우는 데이터 이상(점검 누락 등)에서만 생기며,
/// 이때도 "전날 완료"와 같은 분기로 가지 않고 1로 재시작합니다.
pub fn advance_on_completion(goal: &mut Goal, completion_date: NaiveDate, completed_prior_day: bool) {
    if completed_prior_day || goal.current_streak == 0 {
        goal.current_streak += 1;
    } else {
        goal.current_streak = 1;
    }
    goal.longest_streak = goal.longest_streak.max(goal.current_streak);
    goal.last_completed_date = Some(completion_date);
}

/// 하루를 놓친 목표의 스트릭을 끊습니다. 스트릭이 끊겼으면 true.
///
/// 최장 스트릭은 줄이지 않습니다.
pub fn penalize_for_miss(goal: &mut Goal) -> bool {
    if goal.current_streak > 0 {
        goal.current_streak = 0;
        true
    } else {
        false
    }
}

/// 전날 완료 여부를 조회해 스트릭을 진행시키고 저장합니다.
pub async fn advance(
    conn: &mut SqliteConnection,
    goal: &mut Goal,
    completion_date: NaiveDate,
) -> Result<(), AppError> {
    let prior_day = daily::previous_day(completion_date);
    let completed_prior_day = db::progress::is_completed_on(&mut *conn, &goal.id, prior_day).await?;

    advance_on_completion(goal, completion_date, completed_prior_day);
    db::goals::save_streak(&mut *conn, goal).await
}

/// 스트릭을 끊고 소유자의 코인을 1 차감합니다 (0 미만으로 내려가지 않음).
///
/// 스트릭이 원래 0이었어도 차감은 항상 적용됩니다.
pub async fn penalize(conn: &mut SqliteConnection, goal: &mut Goal) -> Result<bool, AppError> {
    let streak_reset = penalize_for_miss(goal);
    if streak_reset {
        db::goals::save_streak(&mut *conn, goal).await?;
    }
    db::users::apply_miss_penalty(&mut *conn, &goal.owner_id).await?;

    Ok(streak_reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn goal(current: i64, longest: i64) -> Goal {
        Goal {
            id: "g1".into(),
            owner_id: "u1".into(),
            name: "Read".into(),
            description: None,
            daily_target_minutes: 30,
            category: Category::Learning,
            is_active: true,
            skip_break: false,
            current_streak: current,
            longest_streak: longest,
            last_completed_date: None,
            total_sessions_completed: 0,
            total_minutes_completed: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn consecutive_days_increment_by_one() {
        let mut g = goal(0, 0);
        advance_on_completion(&mut g, day(1), false);
        assert_eq!((g.current_streak, g.longest_streak), (1, 1));
        advance_on_completion(&mut g, day(2), true);
        assert_eq!((g.current_streak, g.longest_streak), (2, 2));
        advance_on_completion(&mut g, day(3), true);
        assert_eq!((g.current_streak, g.longest_streak), (3, 3));
        assert_eq!(g.last_completed_date, Some(day(3)));
    }

    #[test]
    fn restart_after_break_keeps_longest() {
        let mut g = goal(5, 5);
        assert!(penalize_for_miss(&mut g));
        assert_eq!((g.current_streak, g.longest_streak), (0, 5));

        advance_on_completion(&mut g, day(10), false);
        assert_eq!((g.current_streak, g.longest_streak), (1, 5));
    }

    #[test]
    fn anomalous_streak_without_prior_day_restarts_at_one() {
        let mut g = goal(4, 9);
        advance_on_completion(&mut g, day(10), false);
        assert_eq!((g.current_streak, g.longest_streak), (1, 9));
    }

    #[test]
    fn seventh_day_updates_longest() {
        let mut g = goal(6, 6);
        advance_on_completion(&mut g, day(7), true);
        assert_eq!((g.current_streak, g.longest_streak), (7, 7));
    }

    #[test]
    fn penalizing_zero_streak_reports_no_reset() {
        let mut g = goal(0, 3);
        assert!(!penalize_for_miss(&mut g));
        assert_eq!((g.current_streak, g.longest_streak), (0, 3));
    }
}
