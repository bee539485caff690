use serde::{Deserialize, Serialize};

/// 사용자 랭크. 모든 목표 중 최장 스트릭으로 결정되며 선언 순서가 곧 등급 순서입니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
pub enum Rank {
    Novice,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Novice,
        Rank::Beginner,
        Rank::Intermediate,
        Rank::Advanced,
        Rank::Expert,
        Rank::Master,
    ];
}

/// 보상 대상 사용자. 계정 자체는 인증 서브시스템 소유이고,
/// 이 서비스는 코인 잔액과 랭크만 관리합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub total_coins: i64,
    pub rank: Rank,
    pub created_at: String,
    pub updated_at: String,
}
