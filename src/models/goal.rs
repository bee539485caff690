//! # 목표(Goal) 모델 정의
//!
//! 사용자가 정의한 습관 목표와 그 스트릭 상태를 담는 구조체들입니다.
//!
//! ## 불변 조건
//! - `longest_streak >= current_streak` (최장 스트릭은 현재 스트릭의 역대 최댓값)
//! - `total_sessions_completed`, `total_minutes_completed`는 줄어들지 않음
//! - 목표는 삭제되지 않고 `is_active = false`로 보관됨 (soft delete)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;

/// 일일 목표 시간의 허용 범위 (분)
pub const MIN_DAILY_TARGET_MINUTES: i64 = 10;
pub const MAX_DAILY_TARGET_MINUTES: i64 = 240;

/// 목표 카테고리 — DB에는 소문자 문자열로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Work,
    Learning,
    Fitness,
    Personal,
    #[default]
    Other,
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Category::Work),
            "learning" => Ok(Category::Learning),
            "fitness" => Ok(Category::Fitness),
            "personal" => Ok(Category::Personal),
            "other" => Ok(Category::Other),
            other => Err(AppError::Validation(format!("Unknown category: {other}"))),
        }
    }
}

/// 목표 엔티티 — DB의 `goals` 테이블 한 행에 대응합니다.
///
/// 스트릭 필드(`current_streak`, `longest_streak`, `last_completed_date`)와
/// 누적 카운터는 세션 기록기와 야간 점검 작업만 변경합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Goal {
    /// 목표 고유 식별자 (UUIDv7)
    pub id: String,
    /// 소유자 사용자 ID
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    /// 하루 목표 시간 (10~240분)
    pub daily_target_minutes: i64,
    pub category: Category,
    /// false면 삭제된 목표 — 목록과 야간 점검에서 제외됩니다.
    pub is_active: bool,
    /// 집중 세션 후 휴식을 건너뛸지 여부 (타이머 UI가 읽는 설정)
    pub skip_break: bool,
    /// 연속 완료 일수. 0이거나 `last_completed_date`로 끝나는 연속 구간의 길이
    pub current_streak: i64,
    /// 역대 최장 스트릭 — 절대 감소하지 않음
    pub longest_streak: i64,
    /// 마지막으로 하루 목표를 달성한 날짜 (날짜 단위)
    pub last_completed_date: Option<NaiveDate>,
    pub total_sessions_completed: i64,
    pub total_minutes_completed: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// 목표 생성 요청 — `POST /api/v1/goals`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    pub description: Option<String>,
    pub daily_target_minutes: i64,
    /// 선택 — 없으면 "other"
    pub category: Option<String>,
    pub skip_break: Option<bool>,
}

/// 목표 수정 요청 — `PATCH /api/v1/goals/{id}`의 요청 본문
///
/// 포함된 필드만 변경합니다. `daily_target_minutes`를 바꿔도
/// 이미 만들어진 오늘의 진행 기록 목표치는 그대로입니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoalRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub daily_target_minutes: Option<i64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub skip_break: Option<bool>,
}

/// 검증을 통과한 목표 입력값
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub description: Option<String>,
    pub daily_target_minutes: i64,
    pub category: Category,
    pub skip_break: bool,
}

/// 일일 목표 시간이 허용 범위 안인지 확인합니다.
pub fn validate_daily_target(minutes: i64) -> Result<(), AppError> {
    if (MIN_DAILY_TARGET_MINUTES..=MAX_DAILY_TARGET_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "daily_target_minutes must be between {MIN_DAILY_TARGET_MINUTES} and {MAX_DAILY_TARGET_MINUTES}"
        )))
    }
}

/// 앞뒤 공백을 제거한 이름을 반환합니다. 비어 있으면 검증 에러입니다.
pub fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Goal name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

impl CreateGoalRequest {
    /// 요청을 검증하여 `NewGoal`로 변환합니다.
    pub fn validate(&self) -> Result<NewGoal, AppError> {
        validate_daily_target(self.daily_target_minutes)?;
        let category = match self.category.as_deref() {
            Some(raw) => raw.parse()?,
            None => Category::default(),
        };

        Ok(NewGoal {
            name: validate_name(&self.name)?,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            daily_target_minutes: self.daily_target_minutes,
            category,
            skip_break: self.skip_break.unwrap_or(false),
        })
    }
}

/// 검증을 통과한 목표 변경값. `None`인 필드는 그대로 둡니다.
#[derive(Debug, Clone, Default)]
pub struct GoalChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub daily_target_minutes: Option<i64>,
    pub category: Option<Category>,
    pub is_active: Option<bool>,
    pub skip_break: Option<bool>,
}

impl UpdateGoalRequest {
    pub fn validate(&self) -> Result<GoalChanges, AppError> {
        if let Some(minutes) = self.daily_target_minutes {
            validate_daily_target(minutes)?;
        }

        Ok(GoalChanges {
            name: self.name.as_deref().map(validate_name).transpose()?,
            description: self.description.as_ref().map(|d| d.trim().to_string()),
            daily_target_minutes: self.daily_target_minutes,
            category: self.category.as_deref().map(str::parse).transpose()?,
            is_active: self.is_active,
            skip_break: self.skip_break,
        })
    }
}
