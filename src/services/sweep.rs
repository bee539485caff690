//! # 야간 스트릭 점검 (StreakResetJob)
//!
//! 하루에 한 번, 전날 목표를 달성하지 못한 활성 목표의 스트릭을 끊고 코인을 1 차감합니다.
//!
//! - `plan_sweep`: 목표 목록과 전날 완료 집합만으로 동작을 정하는 순수 함수
//! - `run_daily_sweep` / `apply_sweep_plan`: 계획을 목표별 트랜잭션으로 적용 (실패한 목표는 로그만 남기고 계속)
//! - `spawn_streak_sweeper`: 설정된 오프셋의 자정마다 점검을 실행하는 tokio 태스크
//!
//! 코인 차감은 멱등이 아닙니다. 같은 날짜로 두 번 돌리면 두 번 차감되므로,
//! 스케줄러는 `sweep_runs`에 실행 날짜를 먼저 기록하고 이미 있으면 건너뜁니다.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::task::JoinHandle;

use crate::{
    db,
    error::AppError,
    models::Goal,
    services::{daily, streak},
};

/// 목표별 차감 트랜잭션의 충돌 재시도 횟수
const PENALTY_RETRIES: u32 = 3;

/// 목표 하나에 대한 점검 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum SweepAction {
    /// 전날 완료 — 변경 없음
    Kept,
    /// 전날 미완료 — 코인 차감, 스트릭이 있었다면 0으로
    Penalized { streak_reset: bool },
    /// 적용 중 저장소 에러 — 다음 점검까지 재시도하지 않음
    Failed,
}

/// 전날 완료 여부로 목표별 동작을 정합니다.
pub fn plan_sweep(goals: &[Goal], completed_yesterday: &HashSet<String>) -> Vec<(String, SweepAction)> {
    goals
        .iter()
        .filter(|goal| goal.is_active)
        .map(|goal| {
            let action = if completed_yesterday.contains(&goal.id) {
                SweepAction::Kept
            } else {
                SweepAction::Penalized {
                    streak_reset: goal.current_streak > 0,
                }
            };
            (goal.id.clone(), action)
        })
        .collect()
}

/// `as_of` 날짜 기준으로 전날을 점검하고 목표별 결과를 반환합니다.
///
/// 목표 하나의 실패는 전체를 멈추지 않습니다. 해당 목표는 `Failed`로 남고
/// 이번 주기의 차감은 기록되지 않습니다.
pub async fn run_daily_sweep(
    pool: &SqlitePool,
    as_of: NaiveDate,
) -> Result<Vec<(String, SweepAction)>, AppError> {
    let yesterday = daily::previous_day(as_of);
    let goals = db::goals::list_all_active_goals(pool).await?;
    let completed = db::progress::completed_goal_ids_on(pool, yesterday).await?;

    let plan = plan_sweep(&goals, &completed);
    Ok(apply_sweep_plan(pool, &goals, plan, as_of).await)
}

/// 계획을 목표별 트랜잭션으로 적용합니다.
///
/// 계획과 적용 사이에 세션이 기록될 수 있으므로, 실제 판단은 트랜잭션 안에서 다시 읽은 값으로 합니다.
pub async fn apply_sweep_plan(
    pool: &SqlitePool,
    goals: &[Goal],
    plan: Vec<(String, SweepAction)>,
    as_of: NaiveDate,
) -> Vec<(String, SweepAction)> {
    let by_id: HashMap<&str, &Goal> = goals.iter().map(|g| (g.id.as_str(), g)).collect();
    let mut results = Vec::with_capacity(plan.len());

    for (goal_id, planned) in plan {
        let action = match (planned, by_id.get(goal_id.as_str())) {
            (SweepAction::Penalized { .. }, Some(goal)) => {
                match penalize_with_retry(pool, goal, as_of).await {
                    Ok(action) => action,
                    Err(e) => {
                        tracing::warn!(goal_id = %goal_id, "Streak sweep failed for goal: {}", e);
                        SweepAction::Failed
                    }
                }
            }
            (other, _) => other,
        };

        if let SweepAction::Penalized { streak_reset } = action {
            tracing::info!(goal_id = %goal_id, streak_reset, "Penalized missed day");
        }
        results.push((goal_id, action));
    }

    let penalized = results
        .iter()
        .filter(|(_, a)| matches!(a, SweepAction::Penalized { .. }))
        .count();
    let failed = results.iter().filter(|(_, a)| *a == SweepAction::Failed).count();
    tracing::info!(
        date = %daily::previous_day(as_of),
        goals = results.len(),
        penalized,
        failed,
        "Streak sweep finished"
    );

    results
}

/// 세션 기록과 겹쳐 잠금 충돌이 나면 몇 번 더 시도합니다.
async fn penalize_with_retry(
    pool: &SqlitePool,
    goal: &Goal,
    as_of: NaiveDate,
) -> Result<SweepAction, AppError> {
    let mut attempt = 0;
    loop {
        match penalize_goal(pool, goal, as_of).await {
            Err(err) if err.is_conflict() && attempt < PENALTY_RETRIES => {
                attempt += 1;
                tracing::debug!(goal_id = %goal.id, attempt, "Retrying streak penalty: {}", err);
                tokio::time::sleep(Duration::from_millis(20) * attempt).await;
            }
            result => return result,
        }
    }
}

/// 목표 하나에 차감을 적용합니다.
///
/// - 전날이 그사이 완료되었으면 `Kept`
/// - 점검이 늦게 돌아 `as_of` 당일 이후에 이미 새 스트릭이 시작되었으면
///   그 스트릭은 두고 코인만 차감합니다.
async fn penalize_goal(
    pool: &SqlitePool,
    goal: &Goal,
    as_of: NaiveDate,
) -> Result<SweepAction, AppError> {
    let yesterday = daily::previous_day(as_of);
    let mut tx = pool.begin().await?;

    if db::progress::is_completed_on(&mut *tx, &goal.id, yesterday).await? {
        return Ok(SweepAction::Kept);
    }
    let mut current = db::goals::get_goal(&mut *tx, &goal.owner_id, &goal.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let restarted_since = current
        .last_completed_date
        .is_some_and(|last| last >= as_of);
    let streak_reset = if restarted_since {
        db::users::apply_miss_penalty(&mut *tx, &current.owner_id).await?;
        false
    } else {
        streak::penalize(&mut tx, &mut current).await?
    };
    tx.commit().await?;

    Ok(SweepAction::Penalized { streak_reset })
}

/// 스케줄러가 호출하는 점검. 같은 날짜에 이미 실행했으면 `None`을 반환합니다.
///
/// 실행 표시를 먼저 남기므로, 점검 도중 프로세스가 죽으면 남은 목표의 차감은 사라집니다.
/// (두 번 차감되는 것보다 한 번 빠지는 쪽을 택합니다.)
pub async fn run_scheduled_sweep(
    pool: &SqlitePool,
    today: NaiveDate,
) -> Result<Option<Vec<(String, SweepAction)>>, AppError> {
    if !db::sweeps::record_run(pool, today).await? {
        tracing::info!(%today, "Streak sweep already ran for this date, skipping");
        return Ok(None);
    }
    run_daily_sweep(pool, today).await.map(Some)
}

/// 설정된 오프셋 기준 다음 자정까지 남은 시간
pub fn duration_until_next_midnight(now: DateTime<Utc>, offset: FixedOffset) -> Duration {
    let local = now.with_timezone(&offset).naive_local();
    let next_midnight = local
        .date()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0));

    match next_midnight {
        Some(next) => (next - local).to_std().unwrap_or(Duration::ZERO),
        None => Duration::ZERO,
    }
}

/// 자정마다 점검을 실행하는 백그라운드 태스크를 띄웁니다.
///
/// 시작할 때 오늘 날짜의 점검이 아직 없으면 먼저 한 번 실행합니다.
/// (자정에 서버가 내려가 있었던 경우)
pub fn spawn_streak_sweeper(pool: SqlitePool, offset: FixedOffset) -> JoinHandle<()> {
    tokio::spawn(async move {
        let today = daily::calendar_day(Utc::now(), offset);
        match db::sweeps::has_run(&pool, today).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(%today, "Catching up on missed streak sweep");
                if let Err(e) = run_scheduled_sweep(&pool, today).await {
                    tracing::error!("Catch-up streak sweep failed: {}", e);
                }
            }
            Err(e) => tracing::error!("Could not check sweep history: {}", e),
        }

        loop {
            let wait = duration_until_next_midnight(Utc::now(), offset);
            tracing::debug!(seconds = wait.as_secs(), "Next streak sweep scheduled");
            tokio::time::sleep(wait).await;

            let today = daily::calendar_day(Utc::now(), offset);
            tracing::info!(%today, "Running daily streak sweep");
            if let Err(e) = run_scheduled_sweep(&pool, today).await {
                tracing::error!("Streak sweep could not run: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::TimeZone;

    fn goal(id: &str, current: i64, active: bool) -> Goal {
        Goal {
            id: id.into(),
            owner_id: "u1".into(),
            name: id.into(),
            description: None,
            daily_target_minutes: 30,
            category: Category::Work,
            is_active: active,
            skip_break: false,
            current_streak: current,
            longest_streak: current,
            last_completed_date: None,
            total_sessions_completed: 0,
            total_minutes_completed: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn plan_penalizes_every_goal_without_completion() {
        let goals = vec![goal("a", 3, true), goal("b", 0, true), goal("c", 5, true)];
        let completed: HashSet<String> = ["c".to_string()].into_iter().collect();

        let plan = plan_sweep(&goals, &completed);
        assert_eq!(
            plan,
            vec![
                ("a".to_string(), SweepAction::Penalized { streak_reset: true }),
                ("b".to_string(), SweepAction::Penalized { streak_reset: false }),
                ("c".to_string(), SweepAction::Kept),
            ]
        );
    }

    #[test]
    fn plan_skips_inactive_goals() {
        let goals = vec![goal("a", 3, false)];
        assert!(plan_sweep(&goals, &HashSet::new()).is_empty());
    }

    #[test]
    fn next_midnight_respects_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 23, 0, 0).unwrap();
        assert_eq!(duration_until_next_midnight(now, utc), Duration::from_secs(3600));

        // UTC 23:00은 UTC+9에서 다음 날 08:00 → 자정까지 16시간
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            duration_until_next_midnight(now, seoul),
            Duration::from_secs(16 * 3600)
        );

        let exactly_midnight = Utc.with_ymd_and_hms(2026, 6, 2, 0, 0, 0).unwrap();
        assert_eq!(
            duration_until_next_midnight(exactly_midnight, utc),
            Duration::from_secs(24 * 3600)
        );
    }
}
