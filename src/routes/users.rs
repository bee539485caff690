//! # 사용자 보상 정보 핸들러
//!
//! - `GET /api/v1/users/me` → `{ id, total_coins, rank, ... }`

use axum::{extract::State, Json};

use crate::{db, error::AppError, middleware::auth::AuthUser, models::User, routes::AppState};

/// 로그인한 사용자의 코인 잔액과 랭크를 조회합니다.
///
/// 아직 목표를 만든 적 없는 사용자도 0코인/Novice로 응답하도록 행을 만들어 둡니다.
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = db::users::get_or_create(&state.pool, &auth.owner_id).await?;
    Ok(Json(user))
}
