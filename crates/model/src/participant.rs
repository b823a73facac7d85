use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{rank::Rank, volume::Tree};

/// Participant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ParticipantId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order-{}", self.0)
    }
}

/// Leg of a binary parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    /// Left leg.
    Left,
    /// Right leg.
    Right,
}

/// Position of a participant in the binary tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Binary parent.
    pub parent: ParticipantId,
    /// Which leg of the parent this participant occupies.
    pub side: Side,
}

/// A participant as exported by the enrollment subsystem.
///
/// The engine only reads participants; ranks and lifetime volume are written
/// back by the caller from the settlement report.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    /// Identifier.
    pub id: ParticipantId,
    /// Enroller in the sponsorship (unilevel) tree.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sponsor: Option<ParticipantId>,
    /// Position in the binary tree.
    #[cfg_attr(feature = "serde", serde(default))]
    pub placement: Option<Placement>,
    /// Enrollment time.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub joined_at: OffsetDateTime,
    /// Paid-as rank recorded by the previous settlement.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_rank: Rank,
    /// Highest rank ever reached.
    #[cfg_attr(feature = "serde", serde(default))]
    pub highest_rank: Rank,
    /// Cumulative volume of all settled periods.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lifetime_volume: Decimal,
}

impl Participant {
    /// Create a participant without edges.
    pub fn new(id: impl Into<ParticipantId>, joined_at: OffsetDateTime) -> Self {
        Self {
            id: id.into(),
            sponsor: None,
            placement: None,
            joined_at,
            current_rank: Rank::default(),
            highest_rank: Rank::default(),
            lifetime_volume: Decimal::ZERO,
        }
    }

    /// Set sponsor.
    pub fn with_sponsor(self, sponsor: impl Into<ParticipantId>) -> Self {
        Self {
            sponsor: Some(sponsor.into()),
            ..self
        }
    }

    /// Set binary placement.
    pub fn with_placement(self, parent: impl Into<ParticipantId>, side: Side) -> Self {
        Self {
            placement: Some(Placement {
                parent: parent.into(),
                side,
            }),
            ..self
        }
    }

    /// Set the recorded current and highest ranks.
    pub fn with_ranks(self, current_rank: Rank, highest_rank: Rank) -> Self {
        Self {
            current_rank,
            highest_rank,
            ..self
        }
    }
}

/// Kind of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum OrderKind {
    /// Regular customer order.
    Customer,
    /// New-distributor kit purchase.
    DistributorKit,
}

/// An order consumed from the checkout subsystem.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    /// Identifier.
    pub id: OrderId,
    /// Buyer.
    pub participant: ParticipantId,
    /// Monetary amount.
    pub amount: Decimal,
    /// Volume points.
    pub volume: Decimal,
    /// Time of purchase.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub placed_at: OffsetDateTime,
    /// Order kind.
    pub kind: OrderKind,
}

impl Order {
    /// Reject negative amounts and volumes.
    pub fn validate(&self) -> crate::Result<()> {
        if self.volume.is_sign_negative() && !self.volume.is_zero() {
            return Err(crate::Error::NegativeVolume(self.id));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(crate::Error::NegativeAmount(self.id));
        }
        Ok(())
    }
}

/// A validated, index-based view of the two trees.
///
/// Indices follow the insertion order of the participants.
#[derive(Debug, Clone)]
pub struct Network {
    participants: IndexMap<ParticipantId, Participant>,
    binary_parent: Vec<Option<usize>>,
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
    sponsor: Vec<Option<usize>>,
    recruits: Vec<Vec<usize>>,
    binary_order: Vec<usize>,
    sponsor_order: Vec<usize>,
}

impl Network {
    /// Build the network, validating both trees.
    ///
    /// Fails on duplicate ids, dangling or self references, two participants
    /// claiming the same leg, and cycles in either tree.
    pub fn try_new(participants: impl IntoIterator<Item = Participant>) -> crate::Result<Self> {
        let mut map = IndexMap::new();
        for participant in participants {
            let id = participant.id;
            if map.insert(id, participant).is_some() {
                return Err(crate::Error::DuplicateParticipant(id));
            }
        }

        let len = map.len();
        let mut binary_parent = vec![None; len];
        let mut left: Vec<Option<usize>> = vec![None; len];
        let mut right: Vec<Option<usize>> = vec![None; len];
        let mut sponsor = vec![None; len];
        let mut recruits = vec![Vec::new(); len];

        for (idx, participant) in map.values().enumerate() {
            if let Some(id) = participant.sponsor {
                if id == participant.id {
                    return Err(crate::Error::SelfReference(id, Tree::Unilevel));
                }
                let parent = map
                    .get_index_of(&id)
                    .ok_or(crate::Error::UnknownParticipant(id))?;
                sponsor[idx] = Some(parent);
                recruits[parent].push(idx);
            }
            if let Some(Placement { parent: id, side }) = participant.placement {
                if id == participant.id {
                    return Err(crate::Error::SelfReference(id, Tree::Binary));
                }
                let parent = map
                    .get_index_of(&id)
                    .ok_or(crate::Error::UnknownParticipant(id))?;
                let slot = match side {
                    Side::Left => &mut left[parent],
                    Side::Right => &mut right[parent],
                };
                if let Some(first) = slot {
                    return Err(crate::Error::PlacementConflict {
                        parent: id,
                        side,
                        first: map[*first].id,
                        second: participant.id,
                    });
                }
                *slot = Some(idx);
                binary_parent[idx] = Some(parent);
            }
        }

        let mut network = Self {
            participants: map,
            binary_parent,
            left,
            right,
            sponsor,
            recruits,
            binary_order: Vec::new(),
            sponsor_order: Vec::new(),
        };
        network.binary_order = network.post_order(Tree::Binary)?;
        network.sponsor_order = network.post_order(Tree::Unilevel)?;
        Ok(network)
    }

    /// Iterative post-order traversal of the given tree.
    ///
    /// A node reached twice, or never reached from a root, is part of a cycle.
    fn post_order(&self, tree: Tree) -> crate::Result<Vec<usize>> {
        let len = self.len();
        let mut visited = vec![false; len];
        let mut order = Vec::with_capacity(len);
        let mut stack = Vec::new();

        for root in (0..len).filter(|idx| self.parent(tree, *idx).is_none()) {
            stack.push((root, false));
            while let Some((idx, expanded)) = stack.pop() {
                if expanded {
                    order.push(idx);
                    continue;
                }
                if visited[idx] {
                    return Err(self.cycle_at(tree, idx));
                }
                visited[idx] = true;
                stack.push((idx, true));
                for child in self.children(tree, idx).rev() {
                    stack.push((child, false));
                }
            }
        }

        match visited.iter().position(|seen| !seen) {
            Some(idx) => Err(self.cycle_at(tree, idx)),
            None => Ok(order),
        }
    }

    fn cycle_at(&self, tree: Tree, idx: usize) -> crate::Error {
        crate::Error::CycleDetected {
            tree,
            participant: self.participants[idx].id,
        }
    }

    fn parent(&self, tree: Tree, idx: usize) -> Option<usize> {
        match tree {
            Tree::Binary => self.binary_parent[idx],
            Tree::Unilevel => self.sponsor[idx],
        }
    }

    fn children(&self, tree: Tree, idx: usize) -> Box<dyn DoubleEndedIterator<Item = usize> + '_> {
        match tree {
            Tree::Binary => Box::new(self.left[idx].into_iter().chain(self.right[idx])),
            Tree::Unilevel => Box::new(self.recruits[idx].iter().copied()),
        }
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Returns whether the network is empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Get the index of a participant.
    pub fn index_of(&self, id: &ParticipantId) -> crate::Result<usize> {
        self.participants
            .get_index_of(id)
            .ok_or(crate::Error::UnknownParticipant(*id))
    }

    /// Get participant by index.
    ///
    /// # Panics
    /// Panics if `idx` is out of bounds.
    pub fn participant(&self, idx: usize) -> &Participant {
        &self.participants[idx]
    }

    /// Get participant by id.
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Iterate over participants in index order.
    pub fn participants(&self) -> impl ExactSizeIterator<Item = &Participant> {
        self.participants.values()
    }

    /// Left child in the binary tree.
    pub fn left_child(&self, idx: usize) -> Option<usize> {
        self.left[idx]
    }

    /// Right child in the binary tree.
    pub fn right_child(&self, idx: usize) -> Option<usize> {
        self.right[idx]
    }

    /// Binary parent.
    pub fn binary_parent(&self, idx: usize) -> Option<usize> {
        self.binary_parent[idx]
    }

    /// Sponsor in the unilevel tree.
    pub fn sponsor(&self, idx: usize) -> Option<usize> {
        self.sponsor[idx]
    }

    /// Direct recruits in the unilevel tree.
    pub fn recruits(&self, idx: usize) -> &[usize] {
        &self.recruits[idx]
    }

    /// Iterate over the sponsorship upline of `idx`, nearest first.
    pub fn sponsor_upline(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.sponsor[idx], |current| self.sponsor[*current])
    }

    /// Binary tree nodes in post-order (children before parents).
    pub fn binary_post_order(&self) -> &[usize] {
        &self.binary_order
    }

    /// Sponsorship tree nodes in post-order (recruits before sponsors).
    pub fn sponsor_post_order(&self) -> &[usize] {
        &self.sponsor_order
    }
}
