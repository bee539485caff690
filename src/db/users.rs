use crate::error::AppError;
use crate::models::user::{Rank, User};
use crate::services::rewards;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

pub async fn ensure_user(executor: impl SqliteExecutor<'_>, id: &str) -> Result<(), AppError> {
    sqlx::query("INSERT OR IGNORE INTO users (id) VALUES (?)")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, total_coins, rank, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn get_or_create(pool: &SqlitePool, id: &str) -> Result<User, AppError> {
    ensure_user(pool, id).await?;
    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve user".to_string()))
}

pub async fn add_coins(executor: impl SqliteExecutor<'_>, id: &str, coins: i64) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET total_coins = total_coins + ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(coins)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}

/// 놓친 하루의 벌점을 차감합니다. 잔액은 같은 UPDATE 안에서 0 아래로 내려가지 않습니다.
pub async fn apply_miss_penalty(executor: impl SqliteExecutor<'_>, id: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET total_coins = MAX(total_coins - ?, 0),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(rewards::coin_penalty_for_miss())
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn set_rank(executor: impl SqliteExecutor<'_>, id: &str, rank: Rank) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET rank = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(rank)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}
