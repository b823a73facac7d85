use rust_decimal::Decimal;

use crate::{
    period::Cadence,
    rank::{Rank, RankTable},
};

/// Recurring bonus for holding `rank`, paid by monthly settlements only.
pub fn rank_maintenance_bonus(
    table: &RankTable,
    rank: Rank,
    is_active: bool,
    cadence: Cadence,
) -> Decimal {
    if is_active && cadence == Cadence::Monthly {
        *table.tier(rank).monthly_bonus()
    } else {
        Decimal::ZERO
    }
}
