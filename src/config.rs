//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: 인증 서브시스템과 공유하는 JWT 서명 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `DAY_OFFSET_MINUTES`: "하루"의 경계를 정하는 고정 UTC 오프셋(분)
//! - `RECORD_MAX_RETRIES`: 세션 기록 시 동시성 충돌 재시도 횟수
//! - `STREAK_SWEEP_ENABLED`: 야간 스트릭 점검 작업 실행 여부
//! - `FRONTEND_DIST`: 빌드된 프론트엔드 디렉토리

use chrono::FixedOffset;
use std::env;
use thiserror::Error;

/// 설정 로딩 실패
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/focusstreak.db?mode=rwc")
    pub database_url: String,
    /// JWT 토큰 검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 5000)
    pub port: u16,
    /// 날짜 경계 기준 시간대. 세션 기록과 야간 점검이 같은 값을 사용합니다.
    /// 서버의 로컬 시간대에 의존하지 않도록 고정 오프셋으로 둡니다.
    pub day_offset: FixedOffset,
    /// 동시성 충돌 시 세션 기록 재시도 횟수 (기본값: 3)
    pub record_max_retries: u32,
    /// 야간 스트릭 점검 작업을 띄울지 여부 (기본값: true)
    pub streak_sweep_enabled: bool,
    /// 빌드된 SPA 프론트엔드 경로 (기본값: "../client/build")
    pub frontend_dist: String,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있지만, 값이 있는데 파싱할 수 없으면 에러입니다.
    /// (잘못된 오프셋으로 조용히 UTC를 쓰면 스트릭이 엉뚱한 날에 끊깁니다.)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정을 구성합니다. 테스트에서 환경변수 없이 사용합니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let offset_minutes: i32 = parse_or(&lookup, "DAY_OFFSET_MINUTES", 0)?;
        let day_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or(ConfigError::Invalid {
            key: "DAY_OFFSET_MINUTES",
            value: offset_minutes.to_string(),
        })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            day_offset,
            record_max_retries: parse_or(&lookup, "RECORD_MAX_RETRIES", 3)?,
            streak_sweep_enabled: parse_or(&lookup, "STREAK_SWEEP_ENABLED", true)?,
            frontend_dist: lookup("FRONTEND_DIST")
                .unwrap_or_else(|| "../client/build".to_string()),
        })
    }
}

/// 값이 없으면 기본값, 있으면 `T`로 파싱합니다.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.day_offset, FixedOffset::east_opt(0).unwrap());
        assert_eq!(config.record_max_retries, 3);
        assert!(config.streak_sweep_enabled);
    }

    #[test]
    fn day_offset_is_read_in_minutes() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("DAY_OFFSET_MINUTES", "540"),
        ]))
        .unwrap();

        assert_eq!(config.day_offset.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("DAY_OFFSET_MINUTES", "five"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DAY_OFFSET_MINUTES", .. }));

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("DAY_OFFSET_MINUTES", "100000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
