//! # 보상 정책
//!
//! 스트릭 길이를 랭크와 코인으로 바꾸는 순수 함수들입니다.
//! 부수 효과가 없으므로 DB 없이 단위 테스트할 수 있습니다.
//!
//! | 최장 스트릭 | 랭크 |
//! |---|---|
//! | 0 이상 | Novice |
//! | 7 이상 | Beginner |
//! | 14 이상 | Intermediate |
//! | 30 이상 | Advanced |
//! | 60 이상 | Expert |
//! | 100 이상 | Master |

use crate::models::Rank;

/// 하루 목표 달성 시 기본 코인
pub const BASE_COINS: i64 = 10;
/// 스트릭이 7의 배수일 때 추가 코인
pub const WEEKLY_BONUS: i64 = 50;
/// 스트릭이 30의 배수일 때 추가 코인
pub const MONTHLY_BONUS: i64 = 200;
/// 하루를 놓친 목표당 차감 코인
pub const MISS_PENALTY: i64 = 1;

/// 랭크 기준표. 높은 기준부터 확인하므로 내림차순으로 둡니다.
const RANK_THRESHOLDS: [(i64, Rank); 6] = [
    (100, Rank::Master),
    (60, Rank::Expert),
    (30, Rank::Advanced),
    (14, Rank::Intermediate),
    (7, Rank::Beginner),
    (0, Rank::Novice),
];

/// 모든 목표 중 최장 스트릭으로 랭크를 계산합니다. 충족하는 가장 높은 기준을 사용합니다.
pub fn rank_for(max_streak: i64) -> Rank {
    RANK_THRESHOLDS
        .iter()
        .find(|(threshold, _)| max_streak >= *threshold)
        .map(|(_, rank)| *rank)
        .unwrap_or(Rank::Novice)
}

/// 이번 완료 직후의 스트릭 길이로 그날의 보상 코인을 계산합니다.
///
/// 7의 배수와 30의 배수 보너스는 함께 적용될 수 있습니다 (예: 210일 → 260).
/// 매번 새로 계산해야 하며, 이전 날의 값을 재사용하지 않습니다.
pub fn coins_for_completion(streak: i64) -> i64 {
    let mut coins = BASE_COINS;
    if streak > 0 && streak % 7 == 0 {
        coins += WEEKLY_BONUS;
    }
    if streak > 0 && streak % 30 == 0 {
        coins += MONTHLY_BONUS;
    }
    coins
}

/// 하루를 놓친 목표 하나당 차감할 코인.
/// 잔액 하한(0) 처리는 차감을 적용하는 쪽(`db::users::apply_miss_penalty`)이 합니다.
pub fn coin_penalty_for_miss() -> i64 {
    MISS_PENALTY
}
