use time::OffsetDateTime;

/// How often settlements are run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Cadence {
    /// Daily.
    Daily,
    /// Weekly.
    Weekly,
    /// Monthly.
    #[default]
    Monthly,
}

/// A settlement period, `[starts_at, ends_at)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettlementPeriod {
    key: String,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    starts_at: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    ends_at: OffsetDateTime,
    cadence: Cadence,
}

impl SettlementPeriod {
    /// Create a new period.
    pub fn try_new(
        key: impl Into<String>,
        starts_at: OffsetDateTime,
        ends_at: OffsetDateTime,
        cadence: Cadence,
    ) -> crate::Result<Self> {
        let key = key.into();
        if key.is_empty() || ends_at <= starts_at {
            return Err(crate::Error::InvalidPeriod(key));
        }
        Ok(Self {
            key,
            starts_at,
            ends_at,
            cadence,
        })
    }

    /// Period key, e.g. `2026-09`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Start (inclusive).
    pub fn starts_at(&self) -> OffsetDateTime {
        self.starts_at
    }

    /// End (exclusive).
    pub fn ends_at(&self) -> OffsetDateTime {
        self.ends_at
    }

    /// Cadence.
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Returns whether `at` falls into this period.
    pub fn contains(&self, at: &OffsetDateTime) -> bool {
        self.starts_at <= *at && *at < self.ends_at
    }

    /// Number of days covered, partial days counted as whole ones.
    pub fn days(&self) -> u32 {
        let duration = self.ends_at - self.starts_at;
        let whole = duration.whole_days();
        let days = if duration > time::Duration::days(whole) {
            whole.saturating_add(1)
        } else {
            whole
        };
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn days_and_bounds() -> crate::Result<()> {
        let period = SettlementPeriod::try_new(
            "2026-09",
            datetime!(2026-09-01 00:00 UTC),
            datetime!(2026-10-01 00:00 UTC),
            Cadence::Monthly,
        )?;
        assert_eq!(period.days(), 30);
        assert!(period.contains(&datetime!(2026-09-01 00:00 UTC)));
        assert!(!period.contains(&datetime!(2026-10-01 00:00 UTC)));

        let period = SettlementPeriod::try_new(
            "d",
            datetime!(2026-09-01 00:00 UTC),
            datetime!(2026-09-01 06:00 UTC),
            Cadence::Daily,
        )?;
        assert_eq!(period.days(), 1);

        let result = SettlementPeriod::try_new(
            "bad",
            datetime!(2026-09-01 00:00 UTC),
            datetime!(2026-09-01 00:00 UTC),
            Cadence::Daily,
        );
        assert!(matches!(result, Err(crate::Error::InvalidPeriod(_))));
        Ok(())
    }
}
