use std::sync::Arc;

use time::OffsetDateTime;
use typed_builder::TypedBuilder;

use crate::{
    activity::ActivityParams, balance::BalanceParams, payout::PayoutParams,
    period::SettlementPeriod, rank::RankTable,
};

/// Commission params.
pub mod commission;

pub use self::commission::{
    BinaryParams, CapBasis, CommissionParams, FastStartParams, MatchingParams, PoolShare,
};

/// What happens to team-based commission earned by an inactive participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum InactivePolicy {
    /// The amount is not paid to anyone.
    #[default]
    Forfeit,
    /// The amount is credited to the nearest active sponsorship upline.
    RollUp,
}

/// Plan-wide policies.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlanPolicies {
    #[builder(default)]
    inactive_commission: InactivePolicy,
    /// Whether the paid-as rank may fall below the previously recorded rank.
    #[builder(default = true)]
    allow_rank_demotion: bool,
}

impl Default for PlanPolicies {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PlanPolicies {
    /// Policy for inactive participants' commission.
    pub fn inactive_commission(&self) -> InactivePolicy {
        self.inactive_commission
    }

    /// Whether ranks may drop between periods.
    pub fn allow_rank_demotion(&self) -> bool {
        self.allow_rank_demotion
    }
}

/// One immutable version of the compensation plan.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanParams {
    version: u32,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    effective_from: OffsetDateTime,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    ranks: RankTable,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    commission: CommissionParams,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    activity: ActivityParams,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    balance: BalanceParams,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    payout: PayoutParams,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    policies: PlanPolicies,
}

impl PlanParams {
    /// Plan version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Time from which this version applies.
    pub fn effective_from(&self) -> OffsetDateTime {
        self.effective_from
    }

    /// Rank table.
    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    /// Commission params.
    pub fn commission(&self) -> &CommissionParams {
        &self.commission
    }

    /// Activity requirements.
    pub fn activity(&self) -> &ActivityParams {
        &self.activity
    }

    /// Leg balance params.
    pub fn balance(&self) -> &BalanceParams {
        &self.balance
    }

    /// Payout params.
    pub fn payout(&self) -> &PayoutParams {
        &self.payout
    }

    /// Policies.
    pub fn policies(&self) -> &PlanPolicies {
        &self.policies
    }

    /// Validate every section.
    pub fn validate(&self) -> crate::Result<()> {
        self.commission.validate()?;
        self.activity.validate()?;
        self.balance.validate()?;
        self.payout.validate()?;
        Ok(())
    }
}

/// The versions of the plan, ordered by `effective_from`.
#[derive(Debug, Clone, Default)]
pub struct PlanRegistry {
    versions: Vec<Arc<PlanParams>>,
}

impl PlanRegistry {
    /// Create a registry from validated plan versions.
    pub fn try_new(versions: impl IntoIterator<Item = PlanParams>) -> crate::Result<Self> {
        let mut registry = Self::default();
        for plan in versions {
            registry.insert(plan)?;
        }
        Ok(registry)
    }

    /// Add a plan version.
    pub fn insert(&mut self, plan: PlanParams) -> crate::Result<()> {
        plan.validate()?;
        if self.versions.iter().any(|p| p.version == plan.version) {
            return Err(crate::Error::DuplicatePlanVersion(plan.version));
        }
        let pos = self
            .versions
            .partition_point(|p| p.effective_from <= plan.effective_from);
        self.versions.insert(pos, Arc::new(plan));
        Ok(())
    }

    /// The plan in effect at the start of `period`.
    pub fn plan_for(&self, period: &SettlementPeriod) -> crate::Result<Arc<PlanParams>> {
        self.versions
            .iter()
            .rev()
            .find(|plan| plan.effective_from <= period.starts_at())
            .cloned()
            .ok_or_else(|| crate::Error::NoPlanInEffect(period.key().to_string()))
    }

    /// Get a version.
    pub fn get(&self, version: u32) -> Option<Arc<PlanParams>> {
        self.versions.iter().find(|p| p.version == version).cloned()
    }

    /// Iterate over versions, oldest first.
    pub fn versions(&self) -> impl Iterator<Item = &PlanParams> {
        self.versions.iter().map(|plan| plan.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;
    use crate::period::Cadence;

    fn plan(version: u32, effective_from: OffsetDateTime) -> PlanParams {
        PlanParams::builder()
            .version(version)
            .effective_from(effective_from)
            .build()
    }

    #[test]
    fn select_plan_in_effect() -> crate::Result<()> {
        let registry = PlanRegistry::try_new([
            plan(2, datetime!(2026-06-01 00:00 UTC)),
            plan(1, datetime!(2025-01-01 00:00 UTC)),
        ])?;
        let may = SettlementPeriod::try_new(
            "2026-05",
            datetime!(2026-05-01 00:00 UTC),
            datetime!(2026-06-01 00:00 UTC),
            Cadence::Monthly,
        )?;
        let june = SettlementPeriod::try_new(
            "2026-06",
            datetime!(2026-06-01 00:00 UTC),
            datetime!(2026-07-01 00:00 UTC),
            Cadence::Monthly,
        )?;
        assert_eq!(registry.plan_for(&may)?.version(), 1);
        assert_eq!(registry.plan_for(&june)?.version(), 2);

        let old = SettlementPeriod::try_new(
            "2024-12",
            datetime!(2024-12-01 00:00 UTC),
            datetime!(2025-01-01 00:00 UTC),
            Cadence::Monthly,
        )?;
        assert!(matches!(
            registry.plan_for(&old),
            Err(crate::Error::NoPlanInEffect(_))
        ));
        Ok(())
    }

    #[test]
    fn reject_duplicate_or_invalid_versions() {
        let result = PlanRegistry::try_new([
            plan(1, datetime!(2025-01-01 00:00 UTC)),
            plan(1, datetime!(2026-01-01 00:00 UTC)),
        ]);
        assert!(matches!(result, Err(crate::Error::DuplicatePlanVersion(1))));

        let invalid = PlanParams::builder()
            .version(3)
            .effective_from(datetime!(2025-01-01 00:00 UTC))
            .commission(CommissionParams::builder().retail_rate(dec!(-0.1)).build())
            .build();
        assert!(PlanRegistry::try_new([invalid]).is_err());
    }
}
