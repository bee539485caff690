//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `goal`: 목표(Goal)와 카테고리, 생성/수정 요청
//! - `progress`: 목표별 하루 진행 기록(DailyProgress)과 통계 응답
//! - `session`: 집중/휴식 세션 관련 구조체
//! - `user`: 보상 대상 사용자(코인, 랭크)
//!
//! `pub use X::*;`는 하위 모듈의 모든 공개 항목을
//! 이 모듈에서 바로 접근할 수 있게 재공개(re-export)합니다.
//! 예: `crate::models::goal::Goal` 대신 `crate::models::Goal`로 접근 가능

pub mod goal;
pub mod progress;
pub mod session;
pub mod user;

pub use goal::*;
pub use progress::*;
pub use session::*;
pub use user::*;
