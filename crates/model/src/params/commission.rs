use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use crate::{rank::Rank, utils::is_rate};

fn percent(value: u32) -> Decimal {
    Decimal::new(i64::from(value), 2)
}

/// Fast-start bonus parameters.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FastStartParams {
    #[builder(default = percent(20))]
    customer_rate: Decimal,
    #[builder(default = percent(25))]
    kit_rate: Decimal,
    #[builder(default = 30)]
    window_days: u32,
}

impl Default for FastStartParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FastStartParams {
    /// Rate applied to a recruit's customer order.
    pub fn customer_rate(&self) -> &Decimal {
        &self.customer_rate
    }

    /// Rate applied to a recruit's distributor-kit purchase.
    pub fn kit_rate(&self) -> &Decimal {
        &self.kit_rate
    }

    /// Window after enrollment, in days (inclusive).
    pub fn window_days(&self) -> u32 {
        self.window_days
    }
}

/// What the binary cap applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CapBasis {
    /// The cap is per day, scaled by the days of the settlement period.
    #[default]
    PerDay,
    /// The cap applies once per settlement run.
    PerRun,
}

/// Binary commission parameters.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BinaryParams {
    #[builder(default = percent(10))]
    rate: Decimal,
    #[builder(default = Decimal::from(5_000))]
    cap: Decimal,
    #[builder(default)]
    cap_basis: CapBasis,
}

impl Default for BinaryParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BinaryParams {
    /// Rate applied to the lesser leg.
    pub fn rate(&self) -> &Decimal {
        &self.rate
    }

    /// Maximum binary commission per participant, per [`CapBasis`] unit.
    pub fn cap(&self) -> &Decimal {
        &self.cap
    }

    /// What the cap applies to.
    pub fn cap_basis(&self) -> CapBasis {
        self.cap_basis
    }

    /// Cap for a period of `days` days.
    pub fn cap_for_days(&self, days: u32) -> crate::Result<Decimal> {
        match self.cap_basis {
            CapBasis::PerDay => self
                .cap
                .checked_mul(Decimal::from(days))
                .ok_or(crate::Error::Overflow),
            CapBasis::PerRun => Ok(self.cap),
        }
    }
}

/// Matching bonus parameters.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchingParams {
    /// Rates per sponsorship generation, nearest first.
    #[builder(default = vec![percent(10), percent(5), percent(5)])]
    rates: Vec<Decimal>,
    #[builder(default = Rank::Gold)]
    min_rank: Rank,
}

impl Default for MatchingParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MatchingParams {
    /// Rate of the given generation (1-based).
    pub fn rate(&self, generation: usize) -> Option<&Decimal> {
        generation
            .checked_sub(1)
            .and_then(|idx| self.rates.get(idx))
    }

    /// Number of generations paid.
    pub fn generations(&self) -> usize {
        self.rates.len()
    }

    /// Minimum paid-as rank of the receiving upline.
    pub fn min_rank(&self) -> Rank {
        self.min_rank
    }
}

/// A leadership pool share: `rate` of the company volume is split among the
/// qualifiers at or above `rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolShare {
    /// Minimum paid-as rank.
    pub rank: Rank,
    /// Share of company volume.
    pub rate: Decimal,
}

/// Commission parameters.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommissionParams {
    #[builder(default = percent(25))]
    retail_rate: Decimal,
    #[builder(default)]
    fast_start: FastStartParams,
    #[builder(default)]
    binary: BinaryParams,
    /// Rates per unilevel depth, level 1 first.
    #[builder(default = vec![percent(5), percent(3), percent(2), percent(1), percent(1)])]
    unilevel_rates: Vec<Decimal>,
    #[builder(default)]
    matching: MatchingParams,
    #[builder(default = vec![
        PoolShare { rank: Rank::Diamond, rate: percent(1) },
        PoolShare { rank: Rank::BlueDiamond, rate: percent(1) },
        PoolShare { rank: Rank::Crown, rate: percent(1) },
    ])]
    leadership_pool: Vec<PoolShare>,
    #[builder(default = 2)]
    currency_decimals: u32,
}

impl Default for CommissionParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CommissionParams {
    /// Retail profit rate.
    pub fn retail_rate(&self) -> &Decimal {
        &self.retail_rate
    }

    /// Fast-start parameters.
    pub fn fast_start(&self) -> &FastStartParams {
        &self.fast_start
    }

    /// Binary parameters.
    pub fn binary(&self) -> &BinaryParams {
        &self.binary
    }

    /// Unilevel rate of the given level (1-based).
    pub fn unilevel_rate(&self, level: usize) -> Option<&Decimal> {
        level
            .checked_sub(1)
            .and_then(|idx| self.unilevel_rates.get(idx))
    }

    /// Number of unilevel levels paid.
    pub fn unilevel_depth(&self) -> usize {
        self.unilevel_rates.len()
    }

    /// Matching parameters.
    pub fn matching(&self) -> &MatchingParams {
        &self.matching
    }

    /// Leadership pool shares.
    pub fn leadership_pool(&self) -> &[PoolShare] {
        &self.leadership_pool
    }

    /// Decimal places of paid amounts.
    pub fn currency_decimals(&self) -> u32 {
        self.currency_decimals
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        let rates = [
            &self.retail_rate,
            &self.fast_start.customer_rate,
            &self.fast_start.kit_rate,
            &self.binary.rate,
        ]
        .into_iter()
        .chain(&self.unilevel_rates)
        .chain(&self.matching.rates)
        .chain(self.leadership_pool.iter().map(|share| &share.rate));
        for rate in rates {
            if !is_rate(rate) {
                return Err(crate::Error::BuildParams("rates must be within [0, 1]"));
            }
        }
        if self.binary.cap.is_sign_negative() {
            return Err(crate::Error::BuildParams("binary cap must not be negative"));
        }
        if self.currency_decimals > 8 {
            return Err(crate::Error::BuildParams("too many currency decimals"));
        }
        if self
            .leadership_pool
            .windows(2)
            .any(|pair| pair[1].rank <= pair[0].rank)
        {
            return Err(crate::Error::BuildParams(
                "leadership pool shares must be ordered by strictly increasing rank",
            ));
        }
        Ok(())
    }
}
