use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use crate::{participant::Network, volume::VolumeSheet};

/// Activity requirements.
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActivityParams {
    #[builder(default = Decimal::from(48))]
    min_personal_volume: Decimal,
    #[builder(default = 1)]
    min_active_direct_downlines: usize,
}

impl Default for ActivityParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ActivityParams {
    /// Minimum personal volume per period.
    pub fn min_personal_volume(&self) -> &Decimal {
        &self.min_personal_volume
    }

    /// Minimum number of active, personally enrolled recruits.
    pub fn min_active_direct_downlines(&self) -> usize {
        self.min_active_direct_downlines
    }

    /// Returns whether a participant is eligible for team-based commissions.
    pub fn is_active(&self, personal_volume: &Decimal, active_direct_downlines: usize) -> bool {
        *personal_volume >= self.min_personal_volume
            && active_direct_downlines >= self.min_active_direct_downlines
    }

    /// Returns whether a recruit counts as an active direct downline.
    ///
    /// Only the recruit's own volume is considered.
    pub fn is_qualified_recruit(&self, personal_volume: &Decimal) -> bool {
        *personal_volume >= self.min_personal_volume
    }

    /// Evaluate the gate for every participant, in network order.
    pub fn evaluate(&self, network: &Network, sheet: &VolumeSheet) -> Vec<bool> {
        (0..network.len())
            .map(|idx| {
                let active_recruits = network
                    .recruits(idx)
                    .iter()
                    .filter(|recruit| self.is_qualified_recruit(&sheet.get(**recruit).personal))
                    .count();
                self.is_active(&sheet.get(idx).personal, active_recruits)
            })
            .collect()
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.min_personal_volume.is_sign_negative() {
            return Err(crate::Error::BuildParams(
                "minimum personal volume must not be negative",
            ));
        }
        Ok(())
    }
}
