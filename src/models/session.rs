//! # 세션 모델 정의
//!
//! 타이머 한 구간(집중 또는 휴식)이 끝날 때마다 하나씩 기록되는 세션입니다.
//! 세션은 생성 후 변경되지 않으며, 예외적으로 메모(notes)만 수정할 수 있습니다.
//!
//! ## 세션 흐름
//! 1. 타이머 구간 종료 → `CreateSessionRequest`로 세션 기록
//! 2. 집중(focus) 세션이면 목표의 하루 진행 기록, 스트릭, 코인이 갱신됨
//! 3. 휴식(break) 세션은 이력으로만 남음

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;
use crate::models::{DailyProgress, Goal};

/// 세션 메모의 최대 길이 (문자 수)
pub const MAX_NOTES_CHARS: usize = 500;

/// 세션 하나의 최대 길이 (분). 하루를 넘는 구간은 받지 않습니다.
pub const MAX_SESSION_MINUTES: i64 = 24 * 60;

/// 세션 종류 — 집중 세션만 진행 기록과 보상에 반영됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionType {
    Focus,
    Break,
}

impl FromStr for SessionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(SessionType::Focus),
            "break" => Ok(SessionType::Break),
            other => Err(AppError::Validation(format!("Unknown session type: {other}"))),
        }
    }
}

/// 세션 엔티티 — DB의 `sessions` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// 세션 고유 식별자 (UUIDv7)
    pub id: String,
    pub owner_id: String,
    pub goal_id: String,
    /// 세션 길이 (분, 양의 정수)
    pub duration_minutes: i64,
    pub session_type: SessionType,
    /// 사용자가 남긴 메모 — 최대 500자
    pub notes: String,
    /// 세션이 끝난 시각 (UTC)
    pub completed_at: DateTime<Utc>,
}

/// 세션 기록 요청 — `POST /api/v1/sessions`의 요청 본문
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub goal_id: String,
    pub duration_minutes: i64,
    /// "focus" 또는 "break" — 없으면 "focus"
    pub session_type: Option<String>,
    pub notes: Option<String>,
}

/// 메모 수정 요청 — `PATCH /api/v1/sessions/{id}`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub notes: Option<String>,
}

/// 세션 목록 조회 쿼리 — `GET /api/v1/sessions?goal_id=...&limit=...`
#[derive(Debug, Default, Deserialize)]
pub struct SessionListQuery {
    pub goal_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// 세션 통계 쿼리 — `GET /api/v1/sessions/stats?period=30`
#[derive(Debug, Default, Deserialize)]
pub struct SessionStatsQuery {
    /// 최근 며칠을 집계할지 (기본 30일)
    pub period: Option<i64>,
}

/// 최근 기간의 집중 세션 통계
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub total_minutes: i64,
    pub total_sessions: i64,
    /// 반올림한 평균 세션 길이 (분)
    pub average_session_length: i64,
    pub period: i64,
}

/// 세션 기록 결과 — 저장된 세션과 갱신된 목표
#[derive(Debug, Clone, Serialize)]
pub struct RecordedSession {
    pub session: Session,
    pub goal: Goal,
    /// 집중 세션이 반영된 오늘의 진행 기록 (휴식 세션이면 None)
    pub progress: Option<DailyProgress>,
}

/// 메모를 최대 길이로 자릅니다. 바이트가 아니라 문자 단위로 자릅니다.
pub fn truncate_notes(notes: &str) -> String {
    notes.chars().take(MAX_NOTES_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_truncated_by_characters() {
        let long = "가".repeat(MAX_NOTES_CHARS + 20);
        let truncated = truncate_notes(&long);
        assert_eq!(truncated.chars().count(), MAX_NOTES_CHARS);
        assert_eq!(truncate_notes("short"), "short");
    }

    #[test]
    fn session_type_parsing() {
        assert_eq!("focus".parse::<SessionType>().unwrap(), SessionType::Focus);
        assert_eq!("break".parse::<SessionType>().unwrap(), SessionType::Break);
        assert!(matches!("nap".parse::<SessionType>(), Err(AppError::Validation(_))));
    }
}
