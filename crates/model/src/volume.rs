use rust_decimal::Decimal;

use crate::{
    participant::{Network, Order},
    period::SettlementPeriod,
    utils::checked_add,
};

/// The two trees of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Tree {
    /// Binary placement tree.
    Binary,
    /// Sponsorship tree.
    Unilevel,
}

/// Aggregated volumes of one participant for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volumes {
    /// Volume of the participant's own orders.
    pub personal: Decimal,
    /// Volume of the left binary subtree.
    pub left_leg: Decimal,
    /// Volume of the right binary subtree.
    pub right_leg: Decimal,
    /// Unilevel volume per depth, `levels[0]` being the direct recruits.
    pub levels: Vec<Decimal>,
    /// Volume of the whole sponsorship downline.
    pub group: Decimal,
    /// Number of orders in the period, including zero-volume ones.
    pub order_count: usize,
}

impl Volumes {
    /// Binary team volume (both legs).
    pub fn team(&self) -> crate::Result<Decimal> {
        checked_add(self.left_leg, self.right_leg)
    }

    /// Volume of the lesser binary leg.
    pub fn lesser_leg(&self) -> Decimal {
        self.left_leg.min(self.right_leg)
    }

    /// Unilevel volume at `level` (1-based).
    pub fn level(&self, level: usize) -> Decimal {
        level
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
            .copied()
            .unwrap_or_default()
    }
}

/// Volumes of every participant of a network, indexed like the network.
#[derive(Debug, Clone)]
pub struct VolumeSheet {
    volumes: Vec<Volumes>,
    company_volume: Decimal,
}

impl VolumeSheet {
    /// Volumes of the participant at `idx`.
    pub fn get(&self, idx: usize) -> &Volumes {
        &self.volumes[idx]
    }

    /// Iterate over volumes in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Volumes> {
        self.volumes.iter()
    }

    /// Total personal volume of the period across the company.
    pub fn company_volume(&self) -> &Decimal {
        &self.company_volume
    }
}

/// Compute personal volumes, binary legs, unilevel levels and group volumes.
///
/// Orders outside `period` are skipped. Orders of unknown participants and
/// negative values are fatal.
pub fn aggregate(
    network: &Network,
    orders: &[Order],
    period: &SettlementPeriod,
    depth: usize,
) -> crate::Result<VolumeSheet> {
    let len = network.len();
    let mut volumes = vec![
        Volumes {
            levels: vec![Decimal::ZERO; depth],
            ..Default::default()
        };
        len
    ];

    let mut company_volume = Decimal::ZERO;
    let mut skipped = 0usize;
    for order in orders {
        order.validate()?;
        let idx = network.index_of(&order.participant)?;
        if !period.contains(&order.placed_at) {
            skipped = skipped.saturating_add(1);
            continue;
        }
        let entry = &mut volumes[idx];
        entry.personal = checked_add(entry.personal, order.volume)?;
        entry.order_count = entry.order_count.saturating_add(1);
        company_volume = checked_add(company_volume, order.volume)?;
    }
    if skipped != 0 {
        tracing::debug!(skipped, period = %period.key(), "skipped orders outside the period");
    }

    rollup_binary(network, &mut volumes)?;
    rollup_unilevel(network, &mut volumes, depth)?;

    Ok(VolumeSheet {
        volumes,
        company_volume,
    })
}

/// Post-order binary rollup: a subtree total is final once both children are.
fn rollup_binary(network: &Network, volumes: &mut [Volumes]) -> crate::Result<()> {
    let mut subtree = vec![Decimal::ZERO; volumes.len()];
    for &idx in network.binary_post_order() {
        let left = network
            .left_child(idx)
            .map(|child| subtree[child])
            .unwrap_or_default();
        let right = network
            .right_child(idx)
            .map(|child| subtree[child])
            .unwrap_or_default();
        let entry = &mut volumes[idx];
        entry.left_leg = left;
        entry.right_leg = right;
        subtree[idx] = checked_add(checked_add(entry.personal, left)?, right)?;
    }
    Ok(())
}

/// Unilevel rollup, one pass per depth level.
///
/// Volume at depth `k` of a sponsor is the sum of the volumes at depth
/// `k - 1` of its recruits, depth `0` being the personal volume.
fn rollup_unilevel(network: &Network, volumes: &mut [Volumes], depth: usize) -> crate::Result<()> {
    let mut previous: Vec<Decimal> = volumes.iter().map(|entry| entry.personal).collect();
    for level in 0..depth {
        let mut current = vec![Decimal::ZERO; volumes.len()];
        for (idx, sum) in current.iter_mut().enumerate() {
            for &recruit in network.recruits(idx) {
                *sum = checked_add(*sum, previous[recruit])?;
            }
            volumes[idx].levels[level] = *sum;
        }
        previous = current;
    }

    let mut group = vec![Decimal::ZERO; volumes.len()];
    for &idx in network.sponsor_post_order() {
        let mut sum = Decimal::ZERO;
        for &recruit in network.recruits(idx) {
            sum = checked_add(sum, checked_add(volumes[recruit].personal, group[recruit])?)?;
        }
        group[idx] = sum;
        volumes[idx].group = sum;
    }
    Ok(())
}
