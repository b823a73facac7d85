use rust_decimal::Decimal;

use crate::{
    commission::{leadership_pool::PoolDistribution, CommissionRecord},
    participant::ParticipantId,
    payout::Payout,
    period::SettlementPeriod,
    rank::{Rank, RankProgress},
    utils::checked_add,
    volume::Volumes,
};

/// Rank and eligibility of one participant after a settlement.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standing {
    /// Participant.
    pub participant: ParticipantId,
    /// Aggregated volumes.
    pub volumes: Volumes,
    /// Passed the activity gate.
    pub active: bool,
    /// Binary legs are balanced.
    pub balanced: bool,
    /// Rank computed from this period's volumes.
    pub evaluated_rank: Rank,
    /// Rank used for this period's commissions.
    pub paid_as_rank: Rank,
    /// Paid-as rank recorded before this period.
    pub previous_rank: Rank,
    /// Highest rank ever reached, including this period.
    pub highest_rank: Rank,
    /// Lifetime volume including this period.
    pub lifetime_volume: Decimal,
    /// Progress towards the rank above the paid-as rank.
    pub progress: RankProgress,
}

/// A paid-as rank change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankChange {
    /// Participant.
    pub participant: ParticipantId,
    /// Previous rank.
    pub from: Rank,
    /// New rank.
    pub to: Rank,
}

impl RankChange {
    /// Returns whether this is a promotion.
    pub fn is_promotion(&self) -> bool {
        self.to > self.from
    }
}

/// Report of the execution of a settlement.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettlementReport {
    pub(super) period: SettlementPeriod,
    pub(super) plan_version: u32,
    pub(super) company_volume: Decimal,
    pub(super) standings: Vec<Standing>,
    pub(super) rank_changes: Vec<RankChange>,
    pub(super) records: Vec<CommissionRecord>,
    pub(super) payouts: Vec<Payout>,
    pub(super) pools: Vec<PoolDistribution>,
    pub(super) forfeited: Decimal,
    pub(super) rolled_up: Decimal,
    #[cfg_attr(feature = "serde", serde(default))]
    pub(super) withheld: Decimal,
}

impl SettlementReport {
    /// Settled period.
    pub fn period(&self) -> &SettlementPeriod {
        &self.period
    }

    /// Plan version used.
    pub fn plan_version(&self) -> u32 {
        self.plan_version
    }

    /// Total personal volume of the period.
    pub fn company_volume(&self) -> &Decimal {
        &self.company_volume
    }

    /// Standings in network order.
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    /// Get the standing of a participant.
    pub fn standing(&self, participant: &ParticipantId) -> Option<&Standing> {
        self.standings
            .iter()
            .find(|standing| standing.participant == *participant)
    }

    /// Rank change events.
    pub fn rank_changes(&self) -> &[RankChange] {
        &self.rank_changes
    }

    /// All emitted commission records.
    pub fn records(&self) -> &[CommissionRecord] {
        &self.records
    }

    /// Records credited to `participant`.
    pub fn records_of<'a>(
        &'a self,
        participant: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a CommissionRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.recipient() == *participant)
    }

    /// Payouts per participant.
    pub fn payouts(&self) -> &[Payout] {
        &self.payouts
    }

    /// Leadership pool distributions.
    pub fn pools(&self) -> &[PoolDistribution] {
        &self.pools
    }

    /// Team-based commission not paid because the earner was inactive.
    pub fn forfeited(&self) -> &Decimal {
        &self.forfeited
    }

    /// Team-based commission credited to an active upline instead.
    pub fn rolled_up(&self) -> &Decimal {
        &self.rolled_up
    }

    /// Commission not paid because the earner failed the leg balance gate.
    pub fn withheld(&self) -> &Decimal {
        &self.withheld
    }

    /// Sum of all payout totals.
    pub fn total_payable(&self) -> crate::Result<Decimal> {
        self.payouts
            .iter()
            .try_fold(Decimal::ZERO, |acc, payout| checked_add(acc, *payout.total()))
    }
}
