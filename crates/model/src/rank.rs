use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

/// Rank tiers, lowest first.
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
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Rank {
    /// Entry rank without requirements.
    Member,
    /// Bronze.
    Bronze,
    /// Silver.
    Silver,
    /// Gold.
    Gold,
    /// Platinum.
    Platinum,
    /// Diamond.
    Diamond,
    /// Blue diamond.
    BlueDiamond,
    /// Crown.
    Crown,
}

impl Default for Rank {
    fn default() -> Self {
        Self::Member
    }
}

impl Rank {
    /// Ordinal position, `0` being the lowest rank.
    pub fn ordinal(self) -> usize {
        usize::from(u8::from(self))
    }

    /// The rank directly above this one.
    pub fn next(self) -> Option<Self> {
        u8::from(self)
            .checked_add(1)
            .and_then(|ordinal| Self::try_from(ordinal).ok())
    }

    /// Returns whether this is the highest rank.
    pub fn is_top(self) -> bool {
        self.next().is_none()
    }
}

/// Requirements and rewards of one rank.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankTier {
    rank: Rank,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    min_personal_volume: Decimal,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    min_team_volume: Decimal,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    min_lesser_leg_volume: Decimal,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    achievement_bonus: Decimal,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    monthly_bonus: Decimal,
}

impl RankTier {
    /// Rank of this tier.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Minimum personal volume.
    pub fn min_personal_volume(&self) -> &Decimal {
        &self.min_personal_volume
    }

    /// Minimum binary team volume.
    pub fn min_team_volume(&self) -> &Decimal {
        &self.min_team_volume
    }

    /// Minimum volume of the lesser binary leg.
    pub fn min_lesser_leg_volume(&self) -> &Decimal {
        &self.min_lesser_leg_volume
    }

    /// One-time bonus paid when the rank is first reached.
    pub fn achievement_bonus(&self) -> &Decimal {
        &self.achievement_bonus
    }

    /// Recurring bonus paid each month the rank is held.
    pub fn monthly_bonus(&self) -> &Decimal {
        &self.monthly_bonus
    }

    /// Returns whether the given volumes satisfy all three thresholds.
    pub fn is_satisfied_by(
        &self,
        personal: &Decimal,
        team: &Decimal,
        lesser_leg: &Decimal,
    ) -> bool {
        *personal >= self.min_personal_volume
            && *team >= self.min_team_volume
            && *lesser_leg >= self.min_lesser_leg_volume
    }

    fn has_requirements(&self) -> bool {
        !(self.min_personal_volume.is_zero()
            && self.min_team_volume.is_zero()
            && self.min_lesser_leg_volume.is_zero())
    }
}

/// The rank table: exactly one tier per [`Rank`], indexed by ordinal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<RankTier>", into = "Vec<RankTier>")
)]
pub struct RankTable {
    tiers: Vec<RankTier>,
}

impl TryFrom<Vec<RankTier>> for RankTable {
    type Error = crate::Error;

    fn try_from(tiers: Vec<RankTier>) -> Result<Self, Self::Error> {
        Self::try_new(tiers)
    }
}

impl From<RankTable> for Vec<RankTier> {
    fn from(table: RankTable) -> Self {
        table.tiers
    }
}

impl RankTable {
    /// Create a rank table.
    ///
    /// Tiers must be given lowest first, one per rank. The lowest tier must
    /// have no requirements and every threshold must be non-decreasing.
    pub fn try_new(tiers: Vec<RankTier>) -> crate::Result<Self> {
        use strum::{EnumCount, IntoEnumIterator};

        if tiers.len() != Rank::COUNT {
            return Err(crate::Error::InvalidRankTable("one tier per rank is required"));
        }
        for (tier, rank) in tiers.iter().zip(Rank::iter()) {
            if tier.rank != rank {
                return Err(crate::Error::MissingRankTier(rank));
            }
            if tier.min_personal_volume.is_sign_negative()
                || tier.min_team_volume.is_sign_negative()
                || tier.min_lesser_leg_volume.is_sign_negative()
                || tier.achievement_bonus.is_sign_negative()
                || tier.monthly_bonus.is_sign_negative()
            {
                return Err(crate::Error::InvalidRankTable("negative value"));
            }
        }
        if tiers[0].has_requirements() {
            return Err(crate::Error::InvalidRankTable(
                "the lowest tier must not have requirements",
            ));
        }
        for pair in tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if upper.min_personal_volume < lower.min_personal_volume
                || upper.min_team_volume < lower.min_team_volume
                || upper.min_lesser_leg_volume < lower.min_lesser_leg_volume
            {
                return Err(crate::Error::InvalidRankTable(
                    "thresholds must be non-decreasing",
                ));
            }
        }
        Ok(Self { tiers })
    }

    /// Get the tier of the given rank.
    pub fn tier(&self, rank: Rank) -> &RankTier {
        &self.tiers[rank.ordinal()]
    }

    /// The lowest tier.
    pub fn lowest(&self) -> &RankTier {
        &self.tiers[0]
    }

    /// Iterate over tiers, lowest first.
    pub fn tiers(&self) -> impl DoubleEndedIterator<Item = &RankTier> + ExactSizeIterator {
        self.tiers.iter()
    }

    /// Get the highest tier whose thresholds are all satisfied.
    pub fn evaluate(&self, personal: &Decimal, team: &Decimal, lesser_leg: &Decimal) -> &RankTier {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.is_satisfied_by(personal, team, lesser_leg))
            .unwrap_or_else(|| self.lowest())
    }

    /// Progress from `current` towards the next tier.
    pub fn progress(
        &self,
        current: Rank,
        personal: &Decimal,
        team: &Decimal,
        lesser_leg: &Decimal,
    ) -> RankProgress {
        let Some(next) = current.next() else {
            return RankProgress {
                next: None,
                personal: Decimal::ONE_HUNDRED,
                team: Decimal::ONE_HUNDRED,
                leg: Decimal::ONE_HUNDRED,
            };
        };
        let tier = self.tier(next);
        RankProgress {
            next: Some(next),
            personal: percentage(personal, &tier.min_personal_volume),
            team: percentage(team, &tier.min_team_volume),
            leg: percentage(lesser_leg, &tier.min_lesser_leg_volume),
        }
    }
}

fn percentage(value: &Decimal, threshold: &Decimal) -> Decimal {
    if threshold.is_zero() {
        return Decimal::ONE_HUNDRED;
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(*threshold))
        .unwrap_or(Decimal::ONE_HUNDRED)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .round_dp(2)
}

impl Default for RankTable {
    fn default() -> Self {
        fn tier(rank: Rank, thresholds: [u64; 3], achievement: u64, monthly: u64) -> RankTier {
            RankTier::builder()
                .rank(rank)
                .min_personal_volume(thresholds[0].into())
                .min_team_volume(thresholds[1].into())
                .min_lesser_leg_volume(thresholds[2].into())
                .achievement_bonus(achievement.into())
                .monthly_bonus(monthly.into())
                .build()
        }

        Self {
            tiers: vec![
                tier(Rank::Member, [0, 0, 0], 0, 0),
                tier(Rank::Bronze, [48, 500, 200], 50, 0),
                tier(Rank::Silver, [100, 2_000, 800], 150, 0),
                tier(Rank::Gold, [200, 5_000, 2_000], 500, 50),
                tier(Rank::Platinum, [300, 15_000, 6_000], 1_500, 150),
                tier(Rank::Diamond, [400, 50_000, 20_000], 5_000, 500),
                tier(Rank::BlueDiamond, [500, 150_000, 60_000], 15_000, 1_500),
                tier(Rank::Crown, [600, 500_000, 200_000], 50_000, 5_000),
            ],
        }
    }
}

/// Progress towards the next rank, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankProgress {
    /// The next rank, `None` at the top.
    pub next: Option<Rank>,
    /// Personal volume progress.
    pub personal: Decimal,
    /// Team volume progress.
    pub team: Decimal,
    /// Lesser-leg volume progress.
    pub leg: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn next_rank() {
        assert_eq!(Rank::Member.next(), Some(Rank::Bronze));
        assert_eq!(Rank::BlueDiamond.next(), Some(Rank::Crown));
        assert_eq!(Rank::Crown.next(), None);
        assert_eq!(<Rank as strum::EnumCount>::COUNT, 8);
        assert_eq!(Rank::Crown.ordinal(), 7);
        assert!(Rank::Crown.is_top());
        assert_eq!(Rank::Gold.ordinal(), 3);
        assert_eq!("blue_diamond".parse::<Rank>().ok(), Some(Rank::BlueDiamond));
    }

    #[test]
    fn evaluate_gold() {
        let table = RankTable::default();
        let tier = table.evaluate(&dec!(200), &dec!(5000), &dec!(2000));
        assert_eq!(tier.rank(), Rank::Gold);
        assert_eq!(*tier.achievement_bonus(), dec!(500));
    }

    #[test]
    fn evaluate_is_limited_by_weakest_threshold() {
        let table = RankTable::default();
        // Team volume qualifies for diamond, personal volume only for silver.
        let tier = table.evaluate(&dec!(150), &dec!(80000), &dec!(30000));
        assert_eq!(tier.rank(), Rank::Silver);
        let tier = table.evaluate(&dec!(0), &dec!(0), &dec!(0));
        assert_eq!(tier.rank(), Rank::Member);
    }

    #[test]
    fn evaluate_is_monotonic() {
        let table = RankTable::default();
        let inputs = [
            (dec!(600), dec!(500000), dec!(200000)),
            (dec!(450), dec!(70000), dec!(25000)),
            (dec!(210), dec!(5100), dec!(1999)),
            (dec!(48), dec!(500), dec!(200)),
        ];
        for (personal, team, leg) in inputs {
            let rank = table.evaluate(&personal, &team, &leg).rank();
            let lowered = [
                table.evaluate(&(personal - dec!(1)), &team, &leg).rank(),
                table.evaluate(&personal, &(team - dec!(1)), &leg).rank(),
                table.evaluate(&personal, &team, &(leg - dec!(1))).rank(),
            ];
            for lower in lowered {
                assert!(lower <= rank, "{lower} > {rank}");
            }
        }
    }

    #[test]
    fn progress_is_clamped() {
        let table = RankTable::default();
        let progress = table.progress(Rank::Silver, &dec!(100), &dec!(9000), &dec!(1000));
        assert_eq!(progress.next, Some(Rank::Gold));
        assert_eq!(progress.personal, dec!(50));
        assert_eq!(progress.team, dec!(100));
        assert_eq!(progress.leg, dec!(50));

        let progress = table.progress(Rank::Crown, &dec!(0), &dec!(0), &dec!(0));
        assert_eq!(progress.next, None);
        assert_eq!(progress.personal, dec!(100));
        assert_eq!(progress.team, dec!(100));
        assert_eq!(progress.leg, dec!(100));
    }

    #[test]
    fn reject_invalid_tables() {
        let mut tiers: Vec<RankTier> = RankTable::default().into();
        tiers.swap(2, 3);
        assert!(matches!(
            RankTable::try_new(tiers),
            Err(crate::Error::MissingRankTier(Rank::Silver))
        ));

        let mut tiers: Vec<RankTier> = RankTable::default().into();
        tiers[0] = RankTier::builder()
            .rank(Rank::Member)
            .min_personal_volume(dec!(1))
            .build();
        assert!(RankTable::try_new(tiers).is_err());

        let mut tiers: Vec<RankTier> = RankTable::default().into();
        tiers[4] = RankTier::builder().rank(Rank::Platinum).build();
        assert!(matches!(
            RankTable::try_new(tiers),
            Err(crate::Error::InvalidRankTable(_))
        ));

        let mut tiers: Vec<RankTier> = RankTable::default().into();
        tiers.pop();
        assert!(RankTable::try_new(tiers).is_err());
    }
}
