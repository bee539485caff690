//! # 도메인 서비스
//!
//! 라우트 핸들러와 DB 계층 사이에서 규칙을 담당하는 모듈들입니다.
//!
//! - `rewards`: 스트릭 → 랭크/코인 (순수 함수)
//! - `daily`: 하루 진행 기록과 완료 판정, 날짜 경계 계산
//! - `streak`: 스트릭 진행과 끊기
//! - `recorder`: 세션 하나를 기록하는 전체 흐름 (트랜잭션, 재시도)
//! - `sweep`: 자정마다 실행되는 스트릭 점검

pub mod daily;
pub mod recorder;
pub mod rewards;
pub mod streak;
pub mod sweep;
