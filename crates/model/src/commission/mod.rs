use rust_decimal::Decimal;

use crate::{
    participant::{OrderId, ParticipantId},
    period::SettlementPeriod,
    rank::Rank,
};

/// Retail profit.
pub mod retail;

/// Fast-start bonus.
pub mod fast_start;

/// Binary commission.
pub mod binary;

/// Unilevel commission.
pub mod unilevel;

/// Matching bonus.
pub mod matching;

/// Rank achievement bonus.
pub mod rank_achievement;

/// Rank maintenance bonus.
pub mod rank_maintenance;

/// Leadership pool.
pub mod leadership_pool;

/// Kind of a bonus.
#[derive(
    Debug,
    Clone,
    Copy,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum BonusKind {
    /// Retail profit.
    Retail,
    /// Fast-start bonus.
    FastStart,
    /// Binary commission.
    Binary,
    /// Unilevel commission.
    Unilevel,
    /// Matching bonus.
    Matching,
    /// Rank achievement bonus.
    RankAchievement,
    /// Rank maintenance bonus.
    RankMaintenance,
    /// Leadership pool share.
    LeadershipPool,
}

impl BonusKind {
    /// Returns whether the bonus is earned on downline volume.
    pub fn is_team_based(&self) -> bool {
        matches!(
            self,
            Self::Binary | Self::Unilevel | Self::Matching | Self::LeadershipPool
        )
    }

    /// Returns whether the bonus requires the recipient to pass the activity gate.
    pub fn is_activity_gated(&self) -> bool {
        matches!(
            self,
            Self::Binary
                | Self::Unilevel
                | Self::Matching
                | Self::RankMaintenance
                | Self::LeadershipPool
        )
    }
}

/// A bonus with its tier details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Bonus {
    /// Retail profit.
    Retail,
    /// Fast-start bonus.
    FastStart,
    /// Binary commission.
    Binary,
    /// Unilevel commission at `level` (1-based).
    Unilevel {
        /// Depth in the sponsorship tree.
        level: u8,
    },
    /// Matching bonus at `generation` (1-based).
    Matching {
        /// Sponsorship generation.
        generation: u8,
    },
    /// Rank achievement bonus.
    RankAchievement {
        /// The rank reached.
        rank: Rank,
    },
    /// Rank maintenance bonus.
    RankMaintenance {
        /// The rank held.
        rank: Rank,
    },
    /// Leadership pool share.
    LeadershipPool {
        /// The pool tier.
        rank: Rank,
    },
}

impl Bonus {
    /// Get the kind.
    pub fn kind(&self) -> BonusKind {
        match self {
            Self::Retail => BonusKind::Retail,
            Self::FastStart => BonusKind::FastStart,
            Self::Binary => BonusKind::Binary,
            Self::Unilevel { .. } => BonusKind::Unilevel,
            Self::Matching { .. } => BonusKind::Matching,
            Self::RankAchievement { .. } => BonusKind::RankAchievement,
            Self::RankMaintenance { .. } => BonusKind::RankMaintenance,
            Self::LeadershipPool { .. } => BonusKind::LeadershipPool,
        }
    }
}

/// What generated a commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "id", rename_all = "snake_case"))]
pub enum Source {
    /// An order.
    Order(OrderId),
    /// A participant's volume or earnings.
    Participant(ParticipantId),
    /// The company-wide volume of the period.
    CompanyVolume,
}

/// An emitted commission. Never modified after emission.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommissionRecord {
    recipient: ParticipantId,
    period: String,
    plan_version: u32,
    bonus: Bonus,
    amount: Decimal,
    source: Source,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    rolled_up_from: Option<ParticipantId>,
}

impl CommissionRecord {
    /// Recipient.
    pub fn recipient(&self) -> ParticipantId {
        self.recipient
    }

    /// Settlement period key.
    pub fn period(&self) -> &str {
        &self.period
    }

    /// Plan version the amount was computed with.
    pub fn plan_version(&self) -> u32 {
        self.plan_version
    }

    /// Bonus.
    pub fn bonus(&self) -> &Bonus {
        &self.bonus
    }

    /// Amount.
    pub fn amount(&self) -> &Decimal {
        &self.amount
    }

    /// Source of the commission.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The inactive participant who would have earned this commission.
    pub fn rolled_up_from(&self) -> Option<ParticipantId> {
        self.rolled_up_from
    }
}

/// Stamps period and plan version on emitted records.
#[derive(Debug, Clone, Copy)]
pub struct Issuer<'a> {
    period: &'a SettlementPeriod,
    plan_version: u32,
}

impl<'a> Issuer<'a> {
    /// Create an issuer for the given period and plan version.
    pub fn new(period: &'a SettlementPeriod, plan_version: u32) -> Self {
        Self {
            period,
            plan_version,
        }
    }

    /// Emit a record, or nothing when `amount` is zero.
    pub fn issue(
        &self,
        recipient: ParticipantId,
        bonus: Bonus,
        amount: Decimal,
        source: Source,
    ) -> Option<CommissionRecord> {
        if amount.is_zero() {
            return None;
        }
        Some(CommissionRecord {
            recipient,
            period: self.period.key().to_string(),
            plan_version: self.plan_version,
            bonus,
            amount,
            source,
            rolled_up_from: None,
        })
    }

    /// Emit a record credited to `recipient` in place of the inactive `from`.
    pub fn issue_rolled_up(
        &self,
        recipient: ParticipantId,
        from: ParticipantId,
        bonus: Bonus,
        amount: Decimal,
        source: Source,
    ) -> Option<CommissionRecord> {
        let mut record = self.issue(recipient, bonus, amount, source)?;
        record.rolled_up_from = Some(from);
        Some(record)
    }
}
