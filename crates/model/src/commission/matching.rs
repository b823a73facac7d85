use rust_decimal::Decimal;

use crate::{params::CommissionParams, rank::Rank, utils::apply_rate};

/// Matching bonus earned by an upline on the binary commission of a
/// downline `generation` levels below in the sponsorship tree.
///
/// The upline must be active and hold at least the qualifying rank.
pub fn matching_bonus(
    params: &CommissionParams,
    generation: usize,
    downline_binary: &Decimal,
    upline_active: bool,
    upline_rank: Rank,
) -> crate::Result<Decimal> {
    let matching = params.matching();
    match matching.rate(generation) {
        Some(rate) if upline_active && upline_rank >= matching.min_rank() => {
            apply_rate(downline_binary, rate, params.currency_decimals())
        }
        _ => Ok(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn generations_and_gates() -> crate::Result<()> {
        let params = CommissionParams::default();
        let binary = dec!(3000);
        assert_eq!(matching_bonus(&params, 1, &binary, true, Rank::Gold)?, dec!(300));
        assert_eq!(matching_bonus(&params, 2, &binary, true, Rank::Crown)?, dec!(150));
        assert_eq!(matching_bonus(&params, 3, &binary, true, Rank::Gold)?, dec!(150));
        assert_eq!(matching_bonus(&params, 4, &binary, true, Rank::Gold)?, Decimal::ZERO);
        assert_eq!(matching_bonus(&params, 1, &binary, true, Rank::Silver)?, Decimal::ZERO);
        assert_eq!(matching_bonus(&params, 1, &binary, false, Rank::Crown)?, Decimal::ZERO);
        Ok(())
    }
}
