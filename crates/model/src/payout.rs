use indexmap::IndexMap;
use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use crate::{commission::CommissionRecord, participant::ParticipantId, utils::checked_add};

/// Payout parameters.
#[derive(Debug, Clone, Default, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PayoutParams {
    /// Maximum total paid to one participant in one period.
    #[builder(default, setter(strip_option))]
    max_total_per_period: Option<Decimal>,
}

impl PayoutParams {
    /// Maximum total per participant per period.
    pub fn max_total_per_period(&self) -> Option<&Decimal> {
        self.max_total_per_period.as_ref()
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self
            .max_total_per_period
            .is_some_and(|cap| cap.is_sign_negative())
        {
            return Err(crate::Error::BuildParams("payout cap must not be negative"));
        }
        Ok(())
    }
}

/// The payable amount of one participant for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payout {
    participant: ParticipantId,
    period: String,
    gross: Decimal,
    total: Decimal,
    records: Vec<CommissionRecord>,
}

impl Payout {
    /// Recipient.
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Settlement period key.
    pub fn period(&self) -> &str {
        &self.period
    }

    /// Sum of all records.
    pub fn gross(&self) -> &Decimal {
        &self.gross
    }

    /// Payable total after global caps.
    pub fn total(&self) -> &Decimal {
        &self.total
    }

    /// Returns whether a global cap reduced the payout.
    pub fn is_capped(&self) -> bool {
        self.total < self.gross
    }

    /// Itemized records.
    pub fn records(&self) -> &[CommissionRecord] {
        &self.records
    }
}

/// Sum records per recipient and apply the global caps.
///
/// Payouts are returned in order of the recipient's first record.
pub fn aggregate_payouts(
    records: &[CommissionRecord],
    params: &PayoutParams,
) -> crate::Result<Vec<Payout>> {
    let mut grouped: IndexMap<(ParticipantId, &str), Vec<CommissionRecord>> = IndexMap::new();
    for record in records {
        grouped
            .entry((record.recipient(), record.period()))
            .or_default()
            .push(record.clone());
    }

    grouped
        .into_iter()
        .map(|((participant, period), records)| {
            let gross = records
                .iter()
                .try_fold(Decimal::ZERO, |acc, record| checked_add(acc, *record.amount()))?;
            let total = match params.max_total_per_period() {
                Some(cap) if gross > *cap => {
                    tracing::debug!(%participant, %gross, %cap, "payout clamped to period cap");
                    *cap
                }
                _ => gross,
            };
            Ok(Payout {
                participant,
                period: period.to_string(),
                gross,
                total,
                records,
            })
        })
        .collect()
}

/// The external payout subsystem.
pub trait PayoutSink {
    /// Hand over one payout for execution.
    fn submit(&mut self, payout: &Payout) -> crate::Result<()>;
}

impl PayoutSink for Vec<Payout> {
    fn submit(&mut self, payout: &Payout) -> crate::Result<()> {
        self.push(payout.clone());
        Ok(())
    }
}

/// Extension trait for [`PayoutSink`].
pub trait PayoutSinkExt: PayoutSink {
    /// Submit all payouts with a positive total.
    fn submit_all<'a>(
        &mut self,
        payouts: impl IntoIterator<Item = &'a Payout>,
    ) -> crate::Result<usize> {
        let mut submitted = 0usize;
        for payout in payouts {
            if payout.total().is_zero() {
                continue;
            }
            self.submit(payout)?;
            submitted = submitted.saturating_add(1);
        }
        Ok(submitted)
    }
}

impl<S: PayoutSink + ?Sized> PayoutSinkExt for S {}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;
    use crate::{
        commission::{Bonus, Issuer, Source},
        participant::OrderId,
        period::{Cadence, SettlementPeriod},
    };

    fn records() -> crate::Result<Vec<CommissionRecord>> {
        let period = SettlementPeriod::try_new(
            "2026-01",
            datetime!(2026-01-01 00:00 UTC),
            datetime!(2026-02-01 00:00 UTC),
            Cadence::Monthly,
        )?;
        let issuer = Issuer::new(&period, 1);
        Ok([
            issuer.issue(
                ParticipantId(1),
                Bonus::Binary,
                dec!(3000),
                Source::Participant(ParticipantId(1)),
            ),
            issuer.issue(
                ParticipantId(2),
                Bonus::Retail,
                dec!(25),
                Source::Order(OrderId(1)),
            ),
            issuer.issue(
                ParticipantId(1),
                Bonus::Unilevel { level: 1 },
                dec!(2500),
                Source::Participant(ParticipantId(1)),
            ),
        ]
        .into_iter()
        .flatten()
        .collect())
    }

    #[test]
    fn sum_per_participant() -> crate::Result<()> {
        let payouts = aggregate_payouts(&records()?, &PayoutParams::default())?;
        assert_eq!(payouts.len(), 2);
        assert_eq!(payouts[0].participant(), ParticipantId(1));
        assert_eq!(*payouts[0].total(), dec!(5500));
        assert_eq!(payouts[0].records().len(), 2);
        assert_eq!(*payouts[1].total(), dec!(25));
        Ok(())
    }

    #[test]
    fn global_cap() -> crate::Result<()> {
        let params = PayoutParams::builder()
            .max_total_per_period(dec!(4000))
            .build();
        let payouts = aggregate_payouts(&records()?, &params)?;
        assert_eq!(*payouts[0].gross(), dec!(5500));
        assert_eq!(*payouts[0].total(), dec!(4000));
        assert!(payouts[0].is_capped());

        let mut sink: Vec<Payout> = Vec::new();
        assert_eq!(sink.submit_all(&payouts)?, 2);
        assert_eq!(sink.len(), 2);
        Ok(())
    }
}
