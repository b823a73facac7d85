use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    commission::{
        binary::binary_commission, fast_start::fast_start_bonus, leadership_pool,
        matching::matching_bonus, rank_achievement::rank_achievement_bonus,
        rank_maintenance::rank_maintenance_bonus, retail::retail_profit,
        unilevel::unilevel_commission, Bonus, BonusKind, CommissionRecord, Issuer, Source,
    },
    params::{InactivePolicy, PlanParams},
    participant::{Network, Order, Participant},
    payout::aggregate_payouts,
    period::SettlementPeriod,
    rank::Rank,
    utils::checked_add,
    volume::{self, VolumeSheet},
};

/// Settlement report.
pub mod report;

/// Run bookkeeping.
pub mod ledger;

pub use self::{
    ledger::{Ledger, LedgerExt, MemoryLedger, RunStatus},
    report::{RankChange, SettlementReport, Standing},
};

/// Input of a settlement run, as exported by the enrollment and checkout
/// subsystems.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Participants with their tree edges.
    pub participants: Vec<Participant>,
    /// Orders; those outside the settled period are ignored.
    #[cfg_attr(feature = "serde", serde(default))]
    pub orders: Vec<Order>,
}

impl Snapshot {
    /// Build the validated network.
    pub fn network(&self) -> crate::Result<Network> {
        Network::try_new(self.participants.iter().cloned())
    }
}

/// A settlement of one period.
///
/// Nothing is observable until [`Settlement::execute`] returns the complete
/// report.
#[must_use = "settlements do nothing unless you `execute` them"]
pub struct Settlement<'a> {
    network: &'a Network,
    orders: &'a [Order],
    period: SettlementPeriod,
    plan: Arc<PlanParams>,
}

impl<'a> Settlement<'a> {
    /// Create a new settlement.
    pub fn try_new(
        network: &'a Network,
        orders: &'a [Order],
        period: SettlementPeriod,
        plan: Arc<PlanParams>,
    ) -> crate::Result<Self> {
        plan.validate()?;
        Ok(Self {
            network,
            orders,
            period,
            plan,
        })
    }

    /// Period to settle.
    pub fn period(&self) -> &SettlementPeriod {
        &self.period
    }

    /// Plan in effect.
    pub fn plan(&self) -> &PlanParams {
        &self.plan
    }

    /// Execute.
    pub fn execute(self) -> crate::Result<SettlementReport> {
        tracing::info!(
            period = %self.period.key(),
            plan_version = self.plan.version(),
            participants = self.network.len(),
            orders = self.orders.len(),
            "settlement started"
        );
        let sheet = volume::aggregate(
            self.network,
            self.orders,
            &self.period,
            self.plan.commission().unilevel_depth(),
        )?;
        let mut run = Run::new(&self, &sheet)?;
        run.order_bonuses()?;
        run.binary()?;
        run.unilevel()?;
        run.matching()?;
        run.rank_bonuses()?;
        run.leadership_pool()?;
        let report = run.finish()?;
        tracing::info!(
            period = %report.period.key(),
            records = report.records.len(),
            payouts = report.payouts.len(),
            forfeited = %report.forfeited,
            withheld = %report.withheld,
            "settlement computed"
        );
        Ok(report)
    }
}

/// Working state of one execution.
struct Run<'s, 'a> {
    settlement: &'s Settlement<'a>,
    sheet: &'s VolumeSheet,
    issuer: Issuer<'s>,
    active: Vec<bool>,
    balanced: Vec<bool>,
    evaluated: Vec<Rank>,
    paid_as: Vec<Rank>,
    binary: Vec<Decimal>,
    records: Vec<CommissionRecord>,
    pools: Vec<leadership_pool::PoolDistribution>,
    forfeited: Decimal,
    rolled_up: Decimal,
    withheld: Decimal,
}

impl<'s, 'a> Run<'s, 'a> {
    fn new(settlement: &'s Settlement<'a>, sheet: &'s VolumeSheet) -> crate::Result<Self> {
        let network = settlement.network;
        let plan = &settlement.plan;
        let active = plan.activity().evaluate(network, sheet);

        let len = network.len();
        let mut balanced = Vec::with_capacity(len);
        let mut evaluated = Vec::with_capacity(len);
        let mut paid_as = Vec::with_capacity(len);
        for (participant, volumes) in network.participants().zip(sheet.iter()) {
            balanced.push(
                plan.balance()
                    .is_balanced(&volumes.left_leg, &volumes.right_leg),
            );
            let rank = plan
                .ranks()
                .evaluate(&volumes.personal, &volumes.team()?, &volumes.lesser_leg())
                .rank();
            evaluated.push(rank);
            paid_as.push(if plan.policies().allow_rank_demotion() {
                rank
            } else {
                rank.max(participant.current_rank)
            });
        }

        Ok(Self {
            settlement,
            sheet,
            issuer: Issuer::new(&settlement.period, plan.version()),
            active,
            balanced,
            evaluated,
            paid_as,
            binary: vec![Decimal::ZERO; len],
            records: Vec::new(),
            pools: Vec::new(),
            forfeited: Decimal::ZERO,
            rolled_up: Decimal::ZERO,
            withheld: Decimal::ZERO,
        })
    }

    fn plan(&self) -> &'s PlanParams {
        &self.settlement.plan
    }

    fn network(&self) -> &'a Network {
        self.settlement.network
    }

    fn id(&self, idx: usize) -> crate::participant::ParticipantId {
        self.network().participant(idx).id
    }

    /// Returns whether `idx` passes the leg balance gate for `kind`.
    fn passes_balance_gate(&self, kind: BonusKind, idx: usize) -> bool {
        !self.plan().balance().is_required_for(kind) || self.balanced[idx]
    }

    /// Returns whether `idx` passes every gate of `kind`.
    fn is_eligible(&self, kind: BonusKind, idx: usize) -> bool {
        self.passes_balance_gate(kind, idx) && (!kind.is_activity_gated() || self.active[idx])
    }

    /// Credit `amount` earned by `idx`. Returns whether a record was issued to `idx`.
    fn credit(
        &mut self,
        idx: usize,
        bonus: Bonus,
        amount: Decimal,
        source: Source,
    ) -> crate::Result<bool> {
        if amount.is_zero() {
            return Ok(false);
        }
        let kind = bonus.kind();
        if !self.passes_balance_gate(kind, idx) {
            tracing::debug!(
                participant = %self.id(idx),
                %amount,
                ?bonus,
                "commission withheld by the balance gate"
            );
            self.withheld = checked_add(self.withheld, amount)?;
            return Ok(false);
        }
        if kind.is_activity_gated() && !self.active[idx] {
            if kind.is_team_based() {
                self.redirect(idx, bonus, amount, source)?;
            } else {
                tracing::debug!(participant = %self.id(idx), ?bonus, "not active");
            }
            return Ok(false);
        }
        let record = self.issuer.issue(self.id(idx), bonus, amount, source);
        let issued = record.is_some();
        self.records.extend(record);
        Ok(issued)
    }

    /// Handle team-based commission that `idx` would have earned if active.
    fn redirect(
        &mut self,
        idx: usize,
        bonus: Bonus,
        amount: Decimal,
        source: Source,
    ) -> crate::Result<()> {
        let from = self.id(idx);
        let target = match self.plan().policies().inactive_commission() {
            InactivePolicy::Forfeit => None,
            InactivePolicy::RollUp => self.network().sponsor_upline(idx).find(|upline| {
                self.active[*upline] && self.passes_balance_gate(bonus.kind(), *upline)
            }),
        };
        match target {
            Some(upline) => {
                let recipient = self.id(upline);
                tracing::debug!(%from, %recipient, %amount, ?bonus, "commission rolled up");
                self.rolled_up = checked_add(self.rolled_up, amount)?;
                let record = self
                    .issuer
                    .issue_rolled_up(recipient, from, bonus, amount, source);
                self.records.extend(record);
            }
            None => {
                tracing::debug!(%from, %amount, ?bonus, "commission forfeited");
                self.forfeited = checked_add(self.forfeited, amount)?;
            }
        }
        Ok(())
    }

    fn order_bonuses(&mut self) -> crate::Result<()> {
        let params = self.plan().commission();
        let network = self.network();
        for order in self.settlement.orders {
            if !self.settlement.period.contains(&order.placed_at) {
                continue;
            }
            let buyer = network.index_of(&order.participant)?;
            let source = Source::Order(order.id);

            let retail = retail_profit(params, order)?;
            self.credit(buyer, Bonus::Retail, retail, source)?;

            if let Some(sponsor) = network.sponsor(buyer) {
                let joined_at = network.participant(buyer).joined_at;
                let amount = fast_start_bonus(params, order, joined_at)?;
                self.credit(sponsor, Bonus::FastStart, amount, source)?;
            }
        }
        Ok(())
    }

    fn binary(&mut self) -> crate::Result<()> {
        let params = self.plan().commission();
        let days = self.settlement.period.days();
        for idx in 0..self.network().len() {
            let volumes = self.sheet.get(idx);
            let commission =
                binary_commission(params, &volumes.left_leg, &volumes.right_leg, true, days)?;
            if commission.is_capped() {
                tracing::debug!(
                    participant = %self.id(idx),
                    uncapped = %commission.uncapped(),
                    paid = %commission.amount(),
                    "binary commission clamped to cap"
                );
            }
            let amount = *commission.amount();
            let source = Source::Participant(self.id(idx));
            if self.credit(idx, Bonus::Binary, amount, source)? {
                self.binary[idx] = amount;
            }
        }
        Ok(())
    }

    fn unilevel(&mut self) -> crate::Result<()> {
        let params = self.plan().commission();
        for idx in 0..self.network().len() {
            let source = Source::Participant(self.id(idx));
            for level in 1..=params.unilevel_depth() {
                let bonus = Bonus::Unilevel {
                    level: u8::try_from(level).map_err(|_| crate::Error::Overflow)?,
                };
                let volume = self.sheet.get(idx).level(level);
                let amount = unilevel_commission(params, level, &volume, true)?;
                self.credit(idx, bonus, amount, source)?;
            }
        }
        Ok(())
    }

    fn matching(&mut self) -> crate::Result<()> {
        let params = self.plan().commission();
        let generations = params.matching().generations();
        for downline in 0..self.network().len() {
            let earned = self.binary[downline];
            if earned.is_zero() {
                continue;
            }
            let source = Source::Participant(self.id(downline));
            let uplines: Vec<usize> = self
                .network()
                .sponsor_upline(downline)
                .take(generations)
                .collect();
            for (offset, upline) in uplines.into_iter().enumerate() {
                let generation = offset.saturating_add(1);
                let bonus = Bonus::Matching {
                    generation: u8::try_from(generation).map_err(|_| crate::Error::Overflow)?,
                };
                let rank = self.paid_as[upline];
                let amount = matching_bonus(params, generation, &earned, true, rank)?;
                self.credit(upline, bonus, amount, source)?;
            }
        }
        Ok(())
    }

    fn rank_bonuses(&mut self) -> crate::Result<()> {
        let plan = self.plan();
        let cadence = self.settlement.period.cadence();
        for idx in 0..self.network().len() {
            let participant = self.network().participant(idx);
            let rank = self.paid_as[idx];
            let source = Source::Participant(participant.id);

            let amount = rank_achievement_bonus(plan.ranks(), rank, participant.highest_rank);
            self.credit(idx, Bonus::RankAchievement { rank }, amount, source)?;

            let amount = rank_maintenance_bonus(plan.ranks(), rank, true, cadence);
            self.credit(idx, Bonus::RankMaintenance { rank }, amount, source)?;
        }
        Ok(())
    }

    fn leadership_pool(&mut self) -> crate::Result<()> {
        let params = self.plan().commission();
        let eligible: Vec<usize> = (0..self.network().len())
            .filter(|idx| self.is_eligible(BonusKind::LeadershipPool, *idx))
            .collect();
        let pools = leadership_pool::distribute(
            params,
            self.sheet.company_volume(),
            eligible.iter().map(|idx| self.paid_as[*idx]),
        )?;
        for pool in &pools {
            for &idx in &eligible {
                if self.paid_as[idx] < pool.rank {
                    continue;
                }
                let record = self.issuer.issue(
                    self.id(idx),
                    Bonus::LeadershipPool { rank: pool.rank },
                    pool.per_qualifier,
                    Source::CompanyVolume,
                );
                self.records.extend(record);
            }
        }
        self.pools = pools;
        Ok(())
    }

    fn finish(self) -> crate::Result<SettlementReport> {
        let plan = self.plan();
        let network = self.network();
        let mut standings = Vec::with_capacity(network.len());
        let mut rank_changes = Vec::new();
        for (idx, participant) in network.participants().enumerate() {
            let volumes = self.sheet.get(idx).clone();
            let paid_as = self.paid_as[idx];
            if paid_as != participant.current_rank {
                rank_changes.push(RankChange {
                    participant: participant.id,
                    from: participant.current_rank,
                    to: paid_as,
                });
            }
            let progress = plan.ranks().progress(
                paid_as,
                &volumes.personal,
                &volumes.team()?,
                &volumes.lesser_leg(),
            );
            standings.push(Standing {
                participant: participant.id,
                active: self.active[idx],
                balanced: self.balanced[idx],
                evaluated_rank: self.evaluated[idx],
                paid_as_rank: paid_as,
                previous_rank: participant.current_rank,
                highest_rank: participant.highest_rank.max(paid_as),
                lifetime_volume: checked_add(participant.lifetime_volume, volumes.personal)?,
                progress,
                volumes,
            });
        }

        let payouts = aggregate_payouts(&self.records, plan.payout())?;
        Ok(SettlementReport {
            period: self.settlement.period.clone(),
            plan_version: plan.version(),
            company_volume: *self.sheet.company_volume(),
            standings,
            rank_changes,
            records: self.records,
            payouts,
            pools: self.pools,
            forfeited: self.forfeited,
            rolled_up: self.rolled_up,
            withheld: self.withheld,
        })
    }
}
