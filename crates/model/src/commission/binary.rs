use rust_decimal::Decimal;

use crate::{params::CommissionParams, utils::apply_rate};

/// Result of the binary calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCommission {
    amount: Decimal,
    uncapped: Decimal,
}

impl BinaryCommission {
    const ZERO: Self = Self {
        amount: Decimal::ZERO,
        uncapped: Decimal::ZERO,
    };

    /// Amount to pay.
    pub fn amount(&self) -> &Decimal {
        &self.amount
    }

    /// Amount before applying the cap.
    pub fn uncapped(&self) -> &Decimal {
        &self.uncapped
    }

    /// Returns whether the cap was applied.
    pub fn is_capped(&self) -> bool {
        self.uncapped > self.amount
    }
}

/// Binary commission: `rate * min(left, right)`, clamped to the daily cap
/// times `days`. Zero for an inactive participant.
pub fn binary_commission(
    params: &CommissionParams,
    left_leg: &Decimal,
    right_leg: &Decimal,
    is_active: bool,
    days: u32,
) -> crate::Result<BinaryCommission> {
    if !is_active {
        return Ok(BinaryCommission::ZERO);
    }
    let binary = params.binary();
    let lesser = left_leg.min(right_leg);
    let uncapped = apply_rate(lesser, binary.rate(), params.currency_decimals())?;
    let cap = binary.cap_for_days(days)?;
    Ok(BinaryCommission {
        amount: uncapped.min(cap),
        uncapped,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::params::{BinaryParams, CapBasis};

    #[test]
    fn ten_percent_of_lesser_leg() -> crate::Result<()> {
        let params = CommissionParams::default();
        let commission = binary_commission(&params, &dec!(50000), &dec!(30000), true, 1)?;
        assert_eq!(*commission.amount(), dec!(3000));
        assert!(!commission.is_capped());
        Ok(())
    }

    #[test]
    fn clamped_to_cap() -> crate::Result<()> {
        let params = CommissionParams::default();
        let commission = binary_commission(&params, &dec!(90000), &dec!(80000), true, 1)?;
        assert_eq!(*commission.amount(), dec!(5000));
        assert_eq!(*commission.uncapped(), dec!(8000));
        assert!(commission.is_capped());

        let commission = binary_commission(&params, &dec!(90000), &dec!(80000), true, 7)?;
        assert_eq!(*commission.amount(), dec!(8000));

        let per_run = CommissionParams::builder()
            .binary(
                BinaryParams::builder()
                    .cap_basis(CapBasis::PerRun)
                    .build(),
            )
            .build();
        let commission = binary_commission(&per_run, &dec!(90000), &dec!(80000), true, 31)?;
        assert_eq!(*commission.amount(), dec!(5000));
        Ok(())
    }

    #[test]
    fn inactive_earns_nothing() -> crate::Result<()> {
        let params = CommissionParams::default();
        for (left, right) in [(dec!(50000), dec!(30000)), (dec!(1), dec!(1)), (dec!(0), dec!(0))] {
            let commission = binary_commission(&params, &left, &right, false, 30)?;
            assert_eq!(*commission.amount(), Decimal::ZERO);
        }
        Ok(())
    }
}
