use std::sync::Arc;

use compplan_cli::{ledger::FileLedger, plan::PlanFile};
use compplan_model::{
    Cadence, Ledger, LedgerExt, ParticipantId, Rank, RunStatus, Settlement, SettlementPeriod,
    Snapshot,
};
use rust_decimal_macros::dec;
use time::macros::datetime;

const SNAPSHOT: &str = include_str!("../../../demos/snapshot.json");

fn january() -> eyre::Result<SettlementPeriod> {
    Ok(SettlementPeriod::try_new(
        "2026-01",
        datetime!(2026-01-01 00:00 UTC),
        datetime!(2026-02-01 00:00 UTC),
        Cadence::Monthly,
    )?)
}

#[test]
fn settle_demo_snapshot() -> eyre::Result<()> {
    let snapshot: Snapshot = serde_json::from_str(SNAPSHOT)?;
    let network = snapshot.network()?;
    let period = january()?;
    let plan = PlanFile::default().into_registry()?.plan_for(&period)?;

    let dir = tempfile::tempdir()?;
    let ledger = FileLedger::new(dir.path());
    let settlement = Settlement::try_new(&network, &snapshot.orders, period, Arc::clone(&plan))?;
    let report = ledger.settle(settlement)?;

    // The February order is ignored.
    let three = report.standing(&ParticipantId(3)).expect("standing");
    assert_eq!(three.volumes.personal, dec!(400));
    assert!(!three.active);

    let one = report.standing(&ParticipantId(1)).expect("standing");
    assert_eq!(one.paid_as_rank, Rank::Bronze);
    assert_eq!(one.highest_rank, Rank::Silver);
    assert_eq!(one.lifetime_volume, dec!(12200));
    assert!(report.rank_changes().is_empty());

    let payout = report
        .payouts()
        .iter()
        .find(|payout| payout.participant() == ParticipantId(1))
        .expect("payout");
    assert_eq!(*payout.total(), dec!(252.75));

    assert!(matches!(
        ledger.status("2026-01")?,
        RunStatus::Completed { plan_version: 1, .. }
    ));
    let stored = ledger.report("2026-01")?.expect("report");
    assert_eq!(stored.payouts(), report.payouts());
    Ok(())
}
