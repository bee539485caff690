//! # focusstreak
//!
//! 집중 타이머 습관 추적기의 백엔드입니다.
//! 세션이 끝날 때마다 목표별 하루 진행 기록을 쌓고, 달성한 날은 스트릭을 늘리고 코인을 지급하며,
//! 매일 밤 전날 달성하지 못한 목표의 스트릭을 끊습니다.
//!
//! 모듈 구성:
//! - `config`: 환경변수 설정
//! - `db`: SQL 쿼리 함수
//! - `error`: `AppError`와 HTTP 응답 변환
//! - `middleware`: JWT 인증 추출기
//! - `models`: 엔티티와 요청/응답 타입
//! - `routes`: HTTP 핸들러와 라우터
//! - `services`: 보상 규칙, 스트릭, 세션 기록기, 야간 점검

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
