use rust_decimal::Decimal;

use crate::{
    params::CommissionParams,
    participant::{Order, OrderKind},
    utils::apply_rate,
};

/// Retail profit on a participant's own customer order.
///
/// Distributor-kit purchases earn no retail profit.
pub fn retail_profit(params: &CommissionParams, order: &Order) -> crate::Result<Decimal> {
    match order.kind {
        OrderKind::Customer => apply_rate(
            &order.amount,
            params.retail_rate(),
            params.currency_decimals(),
        ),
        OrderKind::DistributorKit => Ok(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;
    use crate::participant::{OrderId, ParticipantId};

    fn order(kind: OrderKind, amount: Decimal) -> Order {
        Order {
            id: OrderId(1),
            participant: ParticipantId(1),
            amount,
            volume: dec!(10),
            placed_at: datetime!(2026-01-10 00:00 UTC),
            kind,
        }
    }

    #[test]
    fn quarter_of_customer_orders() -> crate::Result<()> {
        let params = CommissionParams::default();
        assert_eq!(
            retail_profit(&params, &order(OrderKind::Customer, dec!(199.99)))?,
            dec!(49.99)
        );
        assert_eq!(
            retail_profit(&params, &order(OrderKind::DistributorKit, dec!(500)))?,
            Decimal::ZERO
        );
        Ok(())
    }
}
