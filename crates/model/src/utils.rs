use rust_decimal::{Decimal, RoundingStrategy};

/// Checked `a + b`.
#[inline]
pub fn checked_add(a: Decimal, b: Decimal) -> crate::Result<Decimal> {
    a.checked_add(b).ok_or(crate::Error::Overflow)
}

/// Apply a rate using this formula: `value * rate`, rounded toward zero to
/// `decimals` places.
///
/// Rounding toward zero never pays out more than the exact amount.
#[inline]
pub fn apply_rate(value: &Decimal, rate: &Decimal, decimals: u32) -> crate::Result<Decimal> {
    Ok(value
        .checked_mul(*rate)
        .ok_or(crate::Error::Overflow)?
        .round_dp_with_strategy(decimals, RoundingStrategy::ToZero))
}

/// Split `amount` into `parts` equal shares, rounded toward zero.
///
/// Returns zero if `parts` is zero.
#[inline]
pub fn split_evenly(amount: &Decimal, parts: usize, decimals: u32) -> crate::Result<Decimal> {
    if parts == 0 {
        return Ok(Decimal::ZERO);
    }
    let parts = Decimal::from(parts);
    Ok(amount
        .checked_div(parts)
        .ok_or(crate::Error::Computation("splitting amount"))?
        .round_dp_with_strategy(decimals, RoundingStrategy::ToZero))
}

/// Returns whether the value is a valid rate (`0 <= rate <= 1`).
#[inline]
pub fn is_rate(rate: &Decimal) -> bool {
    !rate.is_sign_negative() && *rate <= Decimal::ONE
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rounding_never_overpays() -> crate::Result<()> {
        assert_eq!(apply_rate(&dec!(33.339), &dec!(0.1), 2)?, dec!(3.33));
        assert_eq!(split_evenly(&dec!(100), 3, 2)?, dec!(33.33));
        assert_eq!(split_evenly(&dec!(100), 0, 2)?, Decimal::ZERO);
        Ok(())
    }
}
