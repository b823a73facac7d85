use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use crate::commission::BonusKind;

/// Default minimum share of the lesser leg in the combined binary volume.
pub const DEFAULT_MIN_LESSER_LEG_RATIO: Decimal = Decimal::from_parts(4, 0, 0, false, 1);

/// Leg balance parameters.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BalanceParams {
    #[builder(default = DEFAULT_MIN_LESSER_LEG_RATIO)]
    min_lesser_leg_ratio: Decimal,
    /// Bonus kinds that are only paid when the legs are balanced.
    #[builder(default)]
    required_for: Vec<BonusKind>,
}

impl Default for BalanceParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BalanceParams {
    /// Minimum lesser-leg ratio.
    pub fn min_lesser_leg_ratio(&self) -> &Decimal {
        &self.min_lesser_leg_ratio
    }

    /// Returns whether `kind` requires balanced legs.
    pub fn is_required_for(&self, kind: BonusKind) -> bool {
        self.required_for.contains(&kind)
    }

    /// Returns whether the two legs are balanced.
    ///
    /// Two empty legs are balanced. Otherwise the lesser leg must hold at
    /// least `min_lesser_leg_ratio` of the combined volume (inclusive).
    pub fn is_balanced(&self, left: &Decimal, right: &Decimal) -> bool {
        is_balanced_with_ratio(left, right, &self.min_lesser_leg_ratio)
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if !crate::utils::is_rate(&self.min_lesser_leg_ratio)
            || self.min_lesser_leg_ratio > Decimal::from_parts(5, 0, 0, false, 1)
        {
            return Err(crate::Error::BuildParams(
                "lesser leg ratio must be within [0, 0.5]",
            ));
        }
        if let Some(kind) = self
            .required_for
            .iter()
            .find(|kind| !kind.is_team_based())
        {
            return Err(crate::Error::UnsupportedBalanceGate(*kind));
        }
        Ok(())
    }
}

/// Returns whether the two legs are balanced using the default ratio.
pub fn is_balanced(left: &Decimal, right: &Decimal) -> bool {
    is_balanced_with_ratio(left, right, &DEFAULT_MIN_LESSER_LEG_RATIO)
}

fn is_balanced_with_ratio(left: &Decimal, right: &Decimal, min_ratio: &Decimal) -> bool {
    let Some(total) = left.checked_add(*right) else {
        return false;
    };
    if total.is_zero() {
        return true;
    }
    // `lesser / total >= ratio` without dividing.
    match total.checked_mul(*min_ratio) {
        Some(required) => *left.min(right) >= required,
        None => false,
    }
}
