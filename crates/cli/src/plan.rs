use std::path::Path;

use compplan_model::{PlanParams, PlanRegistry};
use time::OffsetDateTime;

/// Versioned plan tables, as stored in the plan file.
///
/// ```toml
/// [[versions]]
/// version = 1
/// effective_from = "1970-01-01T00:00:00Z"
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanFile {
    /// Plan versions.
    pub versions: Vec<PlanParams>,
}

impl Default for PlanFile {
    fn default() -> Self {
        Self {
            versions: vec![PlanParams::builder()
                .version(1)
                .effective_from(OffsetDateTime::UNIX_EPOCH)
                .build()],
        }
    }
}

impl PlanFile {
    /// Parse from TOML.
    pub fn from_toml(content: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read the plan file.
    pub async fn read(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| eyre::eyre!("failed to read plan file `{}`: {err}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Build the validated registry.
    pub fn into_registry(self) -> eyre::Result<PlanRegistry> {
        Ok(PlanRegistry::try_new(self.versions)?)
    }
}

#[cfg(test)]
mod tests {
    use compplan_model::{Cadence, SettlementPeriod};
    use time::macros::datetime;

    use super::*;

    #[test]
    fn default_plan_file_round_trips() -> eyre::Result<()> {
        let content = toml::to_string_pretty(&PlanFile::default())?;
        let registry = PlanFile::from_toml(&content)?.into_registry()?;
        let period = SettlementPeriod::try_new(
            "2026-01",
            datetime!(2026-01-01 00:00 UTC),
            datetime!(2026-02-01 00:00 UTC),
            Cadence::Monthly,
        )?;
        let plan = registry.plan_for(&period)?;
        assert_eq!(plan.version(), 1);
        assert_eq!(plan.ranks().tiers().len(), 8);
        Ok(())
    }

    #[test]
    fn partial_versions_use_defaults() -> eyre::Result<()> {
        let registry = PlanFile::from_toml(
            r#"
            [[versions]]
            version = 1
            effective_from = "2025-01-01T00:00:00Z"

            [[versions]]
            version = 2
            effective_from = "2026-02-01T00:00:00Z"

            [versions.policies]
            inactive_commission = "roll_up"
            "#,
        )?
        .into_registry()?;
        let february = SettlementPeriod::try_new(
            "2026-02",
            datetime!(2026-02-01 00:00 UTC),
            datetime!(2026-03-01 00:00 UTC),
            Cadence::Monthly,
        )?;
        let plan = registry.plan_for(&february)?;
        assert_eq!(plan.version(), 2);
        assert_eq!(
            plan.policies().inactive_commission(),
            compplan_model::InactivePolicy::RollUp
        );
        Ok(())
    }
}
