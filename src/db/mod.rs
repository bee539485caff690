//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 서비스(services/)와 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `goals`: 목표 CRUD, 스트릭·누적 카운터 갱신
//! - `progress`: 목표별 하루 진행 기록
//! - `sessions`: 집중/휴식 세션 기록과 이력
//! - `sweeps`: 야간 스트릭 점검 실행 기록
//! - `users`: 보상 대상 사용자(코인, 랭크)
//!
//! 이름이 겹치는 함수가 있으므로 재공개하지 않고 `db::goals::get_goal`처럼 모듈 경로로 호출합니다.

pub mod goals;
pub mod progress;
pub mod sessions;
pub mod sweeps;
pub mod users;
