//! # 인증 추출기
//!
//! 토큰 발급(회원가입, 로그인, 갱신)은 인증 서브시스템 몫이고, 이 서비스는 검증만 합니다.
//! 핸들러 인자에 `auth: AuthUser`를 두면 `Authorization: Bearer <jwt>`를 검증한 뒤
//! `claims.sub`를 `owner_id`로 넘겨줍니다. 실패하면 핸들러는 실행되지 않고 401입니다.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::AppError, routes::AppState};

/// HS256 액세스 토큰의 클레임
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // owner id
    pub exp: i64,
    pub iat: i64,
}

/// 인증된 요청의 소유자
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub owner_id: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token is required")]
    MissingToken,
    #[error("Invalid authorization token")]
    InvalidToken,
    #[error("Authorization token has expired")]
    ExpiredToken,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_access_token(token, &state.jwt_secret).map_err(|err| {
            tracing::debug!("Rejected bearer token: {}", err);
            err
        })?;

        Ok(AuthUser {
            owner_id: claims.sub,
        })
    }
}

/// 인증 서브시스템과 같은 형식(HS256, 15분)의 토큰을 만듭니다.
///
/// 테스트와 로컬 개발용 도우미입니다. 서버는 이 함수를 부르지 않으며,
/// 운영 토큰은 인증 서브시스템이 같은 `JWT_SECRET`으로 발급합니다.
pub fn create_access_token(
    owner_id: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: owner_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(15)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// 서명과 만료를 검증합니다. 주체(`sub`)가 비어 있으면 소유자를 알 수 없으므로 거부합니다.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?
    .claims;

    if claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(sub: &str, exp_offset: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            iat: now.timestamp(),
            exp: (now + exp_offset).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap()
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let token = create_access_token("owner-1", "secret").unwrap();
        assert_eq!(verify_access_token(&token, "secret").unwrap().sub, "owner-1");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_access_token("owner-1", "secret").unwrap();
        assert_eq!(
            verify_access_token(&token, "other").unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn expired_and_subjectless_tokens_are_rejected() {
        // 기본 leeway(60초)보다 충분히 과거
        let expired = token_with("owner-1", Duration::minutes(-10));
        assert_eq!(
            verify_access_token(&expired, "secret").unwrap_err(),
            AuthError::ExpiredToken
        );

        let anonymous = token_with("  ", Duration::minutes(10));
        assert_eq!(
            verify_access_token(&anonymous, "secret").unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn auth_errors_become_unauthorized() {
        assert!(matches!(
            AppError::from(AuthError::MissingToken),
            AppError::Unauthorized(_)
        ));
    }
}
