//! # 세션 기록기 (SessionRecorder)
//!
//! 타이머 구간 하나가 끝났을 때 호출되는 핵심 연산입니다.
//!
//! ## 처리 순서
//! ```text
//! 1. 입력 검증 → 목표 소유권 확인 (실패 시 아무것도 저장하지 않음)
//! 2. 세션 행 저장 (별도 커밋 — 이후 단계가 실패해도 남음)
//! ── 집중 세션만 ──────────────────────────────────────────────
//! 3. [트랜잭션 시작]
//!    목표 누적 카운터 증가 (첫 문장이 쓰기 → 쓰기 잠금 확보)
//!    오늘 진행 기록 get_or_create + 시간 누적
//!    오늘 처음 달성했다면: 스트릭 진행 → 코인 계산 → 완료 전환 → 사용자 코인 지급
//!    사용자 랭크 재계산
//!    [커밋]
//! 4. 충돌이면 3단계만 재시도, 횟수를 넘기면 Transient 에러
//! ```

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    models::*,
    services::{daily, rewards, streak},
};

/// 재시도 사이 기본 대기 시간. 시도할 때마다 배수로 늘어납니다.
const RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// 세션 기록기 설정
#[derive(Debug, Clone, Copy)]
pub struct RecorderConfig {
    /// 하루 경계를 정하는 고정 오프셋
    pub day_offset: FixedOffset,
    /// 동시성 충돌 시 재시도 횟수
    pub max_retries: u32,
}

/// 검증을 통과한 세션 입력
#[derive(Debug, Clone)]
struct SessionInput {
    goal_id: String,
    duration_minutes: i64,
    session_type: SessionType,
    notes: String,
}

impl SessionInput {
    fn validate(req: &CreateSessionRequest) -> Result<Self, AppError> {
        if req.duration_minutes <= 0 {
            return Err(AppError::Validation(
                "duration_minutes must be a positive number of minutes".to_string(),
            ));
        }
        if req.duration_minutes > MAX_SESSION_MINUTES {
            return Err(AppError::Validation(format!(
                "duration_minutes must be at most {MAX_SESSION_MINUTES}"
            )));
        }
        let session_type = match req.session_type.as_deref() {
            Some(raw) => raw.parse()?,
            None => SessionType::Focus,
        };

        Ok(Self {
            goal_id: req.goal_id.clone(),
            duration_minutes: req.duration_minutes,
            session_type,
            notes: truncate_notes(req.notes.as_deref().unwrap_or_default()),
        })
    }
}

/// 세션 하나를 기록하고, 집중 세션이면 진행 기록·스트릭·보상을 갱신합니다.
///
/// `now`는 세션 종료 시각이자 "오늘"을 정하는 기준입니다. 핸들러는 `Utc::now()`를 넘기고,
/// 테스트는 날짜 경계를 재현하기 위해 고정된 시각을 넘깁니다.
pub async fn record_session(
    pool: &SqlitePool,
    config: RecorderConfig,
    owner_id: &str,
    req: &CreateSessionRequest,
    now: DateTime<Utc>,
) -> Result<RecordedSession, AppError> {
    let input = SessionInput::validate(req)?;

    let goal = db::goals::get_goal(pool, owner_id, &input.goal_id)
        .await?
        .ok_or(AppError::NotFound)?;
    db::users::ensure_user(pool, owner_id).await?;

    let session = db::sessions::create_session(
        pool,
        owner_id,
        &goal.id,
        input.duration_minutes,
        input.session_type,
        &input.notes,
        now,
    )
    .await?;

    if input.session_type == SessionType::Break {
        return Ok(RecordedSession {
            session,
            goal,
            progress: None,
        });
    }

    let today = daily::calendar_day(now, config.day_offset);
    let mut attempt = 0;
    loop {
        match apply_focus_session(pool, owner_id, &goal.id, input.duration_minutes, today).await {
            Ok((goal, progress)) => {
                return Ok(RecordedSession {
                    session,
                    goal,
                    progress: Some(progress),
                })
            }
            Err(err) if err.is_conflict() => {
                if attempt >= config.max_retries {
                    tracing::warn!(
                        session_id = %session.id,
                        goal_id = %goal.id,
                        attempts = attempt + 1,
                        "Giving up on daily progress update after repeated conflicts: {}",
                        err
                    );
                    return Err(AppError::Transient(format!(
                        "session {} was recorded but progress could not be updated",
                        session.id
                    )));
                }
                attempt += 1;
                tracing::debug!(goal_id = %goal.id, attempt, "Retrying daily progress update: {}", err);
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// 집중 세션의 집계 단계 (한 트랜잭션). 커밋 전에 실패하면 전부 롤백됩니다.
async fn apply_focus_session(
    pool: &SqlitePool,
    owner_id: &str,
    goal_id: &str,
    minutes: i64,
    today: NaiveDate,
) -> Result<(Goal, DailyProgress), AppError> {
    let mut tx = pool.begin().await?;

    let mut goal = db::goals::increment_counters(&mut *tx, owner_id, goal_id, minutes)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut progress =
        daily::get_or_create(&mut tx, owner_id, goal_id, today, goal.daily_target_minutes).await?;
    let just_completed = daily::apply_minutes(&mut progress, minutes);
    db::progress::add_minutes(&mut *tx, &progress.id, minutes).await?;

    if just_completed {
        streak::advance(&mut tx, &mut goal, today).await?;

        let coins = rewards::coins_for_completion(goal.current_streak);
        if !db::progress::mark_completed(&mut *tx, &progress.id, coins).await? {
            return Err(AppError::Conflict(format!(
                "daily progress {} was completed concurrently",
                progress.id
            )));
        }
        daily::complete(&mut progress, coins);
        db::users::add_coins(&mut *tx, owner_id, coins).await?;

        tracing::info!(
            goal_id,
            date = %today,
            streak = goal.current_streak,
            coins,
            "Daily goal completed"
        );
    }

    // 방금 갱신한 목표가 비활성이어도 랭크 계산에는 포함합니다.
    let max_streak = db::goals::max_longest_streak(&mut *tx, owner_id)
        .await?
        .max(goal.longest_streak);
    db::users::set_rank(&mut *tx, owner_id, rewards::rank_for(max_streak)).await?;

    tx.commit().await?;
    Ok((goal, progress))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(minutes: i64, session_type: Option<&str>) -> CreateSessionRequest {
        CreateSessionRequest {
            goal_id: "g1".to_string(),
            duration_minutes: minutes,
            session_type: session_type.map(str::to_string),
            notes: None,
        }
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        assert!(matches!(
            SessionInput::validate(&request(0, None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            SessionInput::validate(&request(-5, None)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn duration_longer_than_a_day_is_rejected() {
        assert!(SessionInput::validate(&request(MAX_SESSION_MINUTES, None)).is_ok());
        assert!(matches!(
            SessionInput::validate(&request(MAX_SESSION_MINUTES + 1, None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            SessionInput::validate(&request(i64::MAX, None)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn session_type_defaults_to_focus() {
        let input = SessionInput::validate(&request(25, None)).unwrap();
        assert_eq!(input.session_type, SessionType::Focus);
        assert_eq!(input.notes, "");

        let input = SessionInput::validate(&request(5, Some("break"))).unwrap();
        assert_eq!(input.session_type, SessionType::Break);

        assert!(SessionInput::validate(&request(5, Some("lunch"))).is_err());
    }
}
