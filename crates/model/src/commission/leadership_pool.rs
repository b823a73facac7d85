use rust_decimal::Decimal;

use crate::{
    params::{CommissionParams, PoolShare},
    rank::Rank,
    utils::{apply_rate, split_evenly},
};

/// Distribution of one leadership pool tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolDistribution {
    /// Pool tier.
    pub rank: Rank,
    /// Pool funded from company volume.
    pub pool: Decimal,
    /// Number of qualifiers.
    pub qualifiers: usize,
    /// Amount paid to each qualifier.
    pub per_qualifier: Decimal,
    /// Part of the pool left undistributed by rounding or lack of qualifiers.
    pub undistributed: Decimal,
}

/// Split one pool tier equally among `qualifiers` participants.
pub fn pool_share(
    params: &CommissionParams,
    share: &PoolShare,
    company_volume: &Decimal,
    qualifiers: usize,
) -> crate::Result<PoolDistribution> {
    let decimals = params.currency_decimals();
    let pool = apply_rate(company_volume, &share.rate, decimals)?;
    let per_qualifier = split_evenly(&pool, qualifiers, decimals)?;
    let paid = per_qualifier
        .checked_mul(Decimal::from(qualifiers))
        .ok_or(crate::Error::Overflow)?;
    let undistributed = pool
        .checked_sub(paid)
        .ok_or(crate::Error::Computation("leadership pool remainder"))?;
    Ok(PoolDistribution {
        rank: share.rank,
        pool,
        qualifiers,
        per_qualifier,
        undistributed,
    })
}

/// Distribute every configured pool tier. `ranks` yields the paid-as rank of
/// each participant eligible to share in pools.
pub fn distribute(
    params: &CommissionParams,
    company_volume: &Decimal,
    ranks: impl Iterator<Item = Rank> + Clone,
) -> crate::Result<Vec<PoolDistribution>> {
    params
        .leadership_pool()
        .iter()
        .map(|share| {
            let qualifiers = ranks.clone().filter(|rank| *rank >= share.rank).count();
            pool_share(params, share, company_volume, qualifiers)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn equal_split_per_tier() -> crate::Result<()> {
        let params = CommissionParams::default();
        let ranks = [Rank::Diamond, Rank::Crown, Rank::Gold, Rank::BlueDiamond];
        let pools = distribute(&params, &dec!(100000), ranks.iter().copied())?;
        assert_eq!(pools.len(), 3);

        assert_eq!(pools[0].rank, Rank::Diamond);
        assert_eq!(pools[0].pool, dec!(1000));
        assert_eq!(pools[0].qualifiers, 3);
        assert_eq!(pools[0].per_qualifier, dec!(333.33));
        assert_eq!(pools[0].undistributed, dec!(0.01));

        assert_eq!(pools[1].qualifiers, 2);
        assert_eq!(pools[1].per_qualifier, dec!(500));
        assert_eq!(pools[2].qualifiers, 1);
        assert_eq!(pools[2].per_qualifier, dec!(1000));
        Ok(())
    }

    #[test]
    fn no_qualifiers_keeps_pool() -> crate::Result<()> {
        let params = CommissionParams::default();
        let pools = distribute(&params, &dec!(5000), [Rank::Gold].into_iter())?;
        assert!(pools.iter().all(|pool| pool.per_qualifier.is_zero()));
        assert_eq!(pools[0].undistributed, dec!(50));
        Ok(())
    }
}
