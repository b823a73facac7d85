use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use crate::{
    params::CommissionParams,
    participant::{Order, OrderKind},
    utils::apply_rate,
};

/// Returns whether `placed_at` falls into the fast-start window of a recruit
/// who joined at `joined_at`. The window end is inclusive.
pub fn is_within_window(
    params: &CommissionParams,
    joined_at: OffsetDateTime,
    placed_at: OffsetDateTime,
) -> bool {
    let elapsed = placed_at - joined_at;
    !elapsed.is_negative()
        && elapsed <= Duration::days(i64::from(params.fast_start().window_days()))
}

/// Fast-start bonus earned by the sponsor of a recruit on the recruit's order.
///
/// Zero outside the window; never prorated.
pub fn fast_start_bonus(
    params: &CommissionParams,
    order: &Order,
    recruit_joined_at: OffsetDateTime,
) -> crate::Result<Decimal> {
    if !is_within_window(params, recruit_joined_at, order.placed_at) {
        return Ok(Decimal::ZERO);
    }
    let fast_start = params.fast_start();
    let rate = match order.kind {
        OrderKind::Customer => fast_start.customer_rate(),
        OrderKind::DistributorKit => fast_start.kit_rate(),
    };
    apply_rate(&order.amount, rate, params.currency_decimals())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;
    use crate::participant::{OrderId, ParticipantId};

    fn order(kind: OrderKind, placed_at: OffsetDateTime) -> Order {
        Order {
            id: OrderId(1),
            participant: ParticipantId(2),
            amount: dec!(100),
            volume: dec!(100),
            placed_at,
            kind,
        }
    }

    #[test]
    fn window_boundaries() -> crate::Result<()> {
        let params = CommissionParams::default();
        let joined = datetime!(2026-01-01 12:00 UTC);

        let day_29 = order(OrderKind::Customer, datetime!(2026-01-30 12:00 UTC));
        assert_eq!(fast_start_bonus(&params, &day_29, joined)?, dec!(20));

        let day_30 = order(OrderKind::DistributorKit, datetime!(2026-01-31 12:00 UTC));
        assert_eq!(fast_start_bonus(&params, &day_30, joined)?, dec!(25));

        let day_31 = order(OrderKind::Customer, datetime!(2026-02-01 12:00 UTC));
        assert_eq!(fast_start_bonus(&params, &day_31, joined)?, Decimal::ZERO);

        let before = order(OrderKind::Customer, datetime!(2025-12-31 12:00 UTC));
        assert_eq!(fast_start_bonus(&params, &before, joined)?, Decimal::ZERO);
        Ok(())
    }
}
