use rust_decimal::Decimal;

use crate::rank::{Rank, RankTable};

/// One-time bonus for reaching `rank`.
///
/// Paid only when `rank` strictly exceeds the highest rank ever recorded, so
/// each tier is paid at most once per participant.
pub fn rank_achievement_bonus(table: &RankTable, rank: Rank, highest_rank: Rank) -> Decimal {
    if rank > highest_rank {
        *table.tier(rank).achievement_bonus()
    } else {
        Decimal::ZERO
    }
}
