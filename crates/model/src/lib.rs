#![deny(missing_docs)]
#![deny(unreachable_pub)]
#![warn(clippy::arithmetic_side_effects)]

//! Compensation plan model: network volumes, ranks, commissions and
//! period settlement.

/// Participants, orders and the network.
pub mod participant;

/// Settlement periods.
pub mod period;

/// Ranks.
pub mod rank;

/// Volume aggregation.
pub mod volume;

/// Leg balance.
pub mod balance;

/// Activity gate.
pub mod activity;

/// Plan params.
pub mod params;

/// Commissions.
pub mod commission;

/// Payouts.
pub mod payout;

/// Settlement.
pub mod settlement;

/// Error type.
pub mod error;

/// Decimal utils.
pub mod utils;


pub use commission::{Bonus, BonusKind, CommissionRecord, Source};
pub use error::Error;
pub use params::{InactivePolicy, PlanParams, PlanRegistry};
pub use participant::{Network, Order, OrderId, OrderKind, Participant, ParticipantId, Side};
pub use payout::{Payout, PayoutSink, PayoutSinkExt};
pub use period::{Cadence, SettlementPeriod};
pub use rank::{Rank, RankTable};
pub use settlement::{
    Ledger, LedgerExt, MemoryLedger, RunStatus, Settlement, SettlementReport, Snapshot,
};
pub use volume::{Tree, VolumeSheet, Volumes};

/// Alias for result.
pub type Result<T> = std::result::Result<T, Error>;
