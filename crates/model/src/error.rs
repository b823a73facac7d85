use crate::{
    commission::BonusKind,
    participant::{OrderId, ParticipantId, Side},
    rank::Rank,
    volume::Tree,
};

/// Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid Argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Unknown computation error.
    #[error("unknown computation error: {0}")]
    Computation(&'static str),
    /// Overflow.
    #[error("overflow")]
    Overflow,
    /// Build params error.
    #[error("build params: {0}")]
    BuildParams(&'static str),
    /// Invalid rank table.
    #[error("invalid rank table: {0}")]
    InvalidRankTable(&'static str),
    /// Missing tier for the given rank.
    #[error("missing tier for rank: {0}")]
    MissingRankTier(Rank),
    /// Duplicate participant in the snapshot.
    #[error("duplicate participant: {0}")]
    DuplicateParticipant(ParticipantId),
    /// A participant referenced by an edge or an order is not in the snapshot.
    #[error("unknown participant: {0}")]
    UnknownParticipant(ParticipantId),
    /// A participant references itself as sponsor or placement parent.
    #[error("participant {0} references itself in the `{1:?}` tree")]
    SelfReference(ParticipantId, Tree),
    /// Both participants claim the same side under one binary parent.
    #[error("{side:?} leg of {parent} is claimed by both {first} and {second}")]
    PlacementConflict {
        /// Binary parent.
        parent: ParticipantId,
        /// Contested side.
        side: Side,
        /// First claimant.
        first: ParticipantId,
        /// Second claimant.
        second: ParticipantId,
    },
    /// Cycle detected in a tree.
    #[error("cycle detected in the `{tree:?}` tree at participant {participant}")]
    CycleDetected {
        /// The tree containing the cycle.
        tree: Tree,
        /// A participant on (or below) the cycle.
        participant: ParticipantId,
    },
    /// Negative volume reached the engine.
    #[error("negative volume in order {0}")]
    NegativeVolume(OrderId),
    /// Negative monetary amount reached the engine.
    #[error("negative amount in order {0}")]
    NegativeAmount(OrderId),
    /// Invalid settlement period.
    #[error("invalid settlement period `{0}`")]
    InvalidPeriod(String),
    /// No plan version is in effect for the period.
    #[error("no plan version is in effect for period `{0}`")]
    NoPlanInEffect(String),
    /// Duplicate plan version.
    #[error("duplicate plan version {0}")]
    DuplicatePlanVersion(u32),
    /// A settlement run for the period is in progress.
    #[error("settlement of period `{0}` is already in progress")]
    SettlementInProgress(String),
    /// The period has already been settled.
    #[error("period `{0}` has already been settled")]
    AlreadySettled(String),
    /// The period is not in the running state.
    #[error("settlement of period `{0}` is not running")]
    SettlementNotRunning(String),
    /// Bonus kind is not supported by the given gate.
    #[error("bonus kind `{0}` cannot be gated on balanced legs")]
    UnsupportedBalanceGate(BonusKind),
    /// Error reported by a ledger or payout backend.
    #[error("backend: {0}")]
    Backend(String),
}
