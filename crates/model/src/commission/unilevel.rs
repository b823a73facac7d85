use rust_decimal::Decimal;

use crate::{params::CommissionParams, utils::apply_rate};

/// Unilevel commission on the volume of `level` (1-based).
///
/// Zero for an inactive participant and for levels without a rate.
pub fn unilevel_commission(
    params: &CommissionParams,
    level: usize,
    level_volume: &Decimal,
    is_active: bool,
) -> crate::Result<Decimal> {
    match params.unilevel_rate(level) {
        Some(rate) if is_active => apply_rate(level_volume, rate, params.currency_decimals()),
        _ => Ok(Decimal::ZERO),
    }
}
