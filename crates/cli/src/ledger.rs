use std::{
    collections::HashMap,
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use compplan_model::{Ledger, RunStatus, SettlementReport};
use fd_lock::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

const LOCK: &str = "lock";
const STATUS: &str = "status.json";
const REPORT: &str = "report.json";

type Held = HashMap<String, RwLock<fs::File>>;

/// A [`Ledger`] storing one directory per period.
///
/// `begin` takes an exclusive OS lock on the period's lock file and holds it
/// until `commit` or `fail`. The lock is released by the OS if the process
/// dies, so a period left `Running` by a crashed run can be settled again.
/// Status and report files are replaced atomically.
#[derive(Clone)]
pub struct FileLedger {
    root: PathBuf,
    held: Arc<Mutex<Held>>,
}

impl fmt::Debug for FileLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLedger")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FileLedger {
    /// Create a ledger rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            held: Default::default(),
        }
    }

    fn dir(&self, period: &str) -> compplan_model::Result<PathBuf> {
        let valid = !period.is_empty()
            && period
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !period.starts_with('.');
        if !valid {
            return Err(compplan_model::Error::InvalidPeriod(period.to_string()));
        }
        Ok(self.root.join(period))
    }

    /// Get the committed report of a period.
    pub fn report(&self, period: &str) -> compplan_model::Result<Option<SettlementReport>> {
        read_json(&self.dir(period)?.join(REPORT))
    }

    fn held(&self) -> compplan_model::Result<MutexGuard<'_, Held>> {
        self.held.lock().map_err(|_| backend("ledger lock poisoned"))
    }

    /// Returns the directory of a period this ledger is running.
    fn running_dir(&self, held: &Held, period: &str) -> compplan_model::Result<PathBuf> {
        if !held.contains_key(period) {
            return Err(compplan_model::Error::SettlementNotRunning(
                period.to_string(),
            ));
        }
        self.dir(period)
    }
}

impl Ledger for FileLedger {
    fn status(&self, period: &str) -> compplan_model::Result<RunStatus> {
        Ok(read_json(&self.dir(period)?.join(STATUS))?.unwrap_or(RunStatus::NotRun))
    }

    fn begin(&self, period: &str) -> compplan_model::Result<()> {
        let dir = self.dir(period)?;
        let mut held = self.held()?;
        if held.contains_key(period) {
            return Err(compplan_model::Error::SettlementInProgress(
                period.to_string(),
            ));
        }

        fs::create_dir_all(&dir).map_err(backend)?;
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK))
            .map_err(backend)?;
        let mut lock = RwLock::new(file);
        match lock.try_write() {
            // Unlocked when the file is closed.
            Ok(guard) => std::mem::forget(guard),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                return Err(compplan_model::Error::SettlementInProgress(
                    period.to_string(),
                ));
            }
            Err(err) => return Err(backend(err)),
        }

        match self.status(period)? {
            RunStatus::Completed { .. } => {
                return Err(compplan_model::Error::AlreadySettled(period.to_string()));
            }
            RunStatus::Running => {
                tracing::warn!(%period, "retrying a period left running by an interrupted run");
            }
            RunStatus::NotRun | RunStatus::Failed { .. } => {}
        }
        write_json(&dir, STATUS, &RunStatus::Running)?;
        held.insert(period.to_string(), lock);
        Ok(())
    }

    fn commit(&self, report: &SettlementReport) -> compplan_model::Result<()> {
        let period = report.period().key();
        let mut held = self.held()?;
        let dir = self.running_dir(&held, period)?;
        let status = RunStatus::Completed {
            plan_version: report.plan_version(),
            records: report.records().len(),
            total: report.total_payable()?,
        };
        write_json(&dir, REPORT, report)?;
        write_json(&dir, STATUS, &status)?;
        held.remove(period);
        tracing::info!(%period, dir = %dir.display(), "settlement committed");
        Ok(())
    }

    fn fail(&self, period: &str, reason: &str) -> compplan_model::Result<()> {
        let mut held = self.held()?;
        let dir = self.running_dir(&held, period)?;
        write_json(
            &dir,
            STATUS,
            &RunStatus::Failed {
                reason: reason.to_string(),
            },
        )?;
        held.remove(period);
        Ok(())
    }
}

fn backend(err: impl fmt::Display) -> compplan_model::Error {
    compplan_model::Error::Backend(err.to_string())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> compplan_model::Result<Option<T>> {
    match fs::read(path) {
        Ok(content) => serde_json::from_slice(&content).map(Some).map_err(backend),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(backend(err)),
    }
}

fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    name: &str,
    value: &T,
) -> compplan_model::Result<()> {
    let mut file = NamedTempFile::new_in(dir).map_err(backend)?;
    serde_json::to_writer_pretty(&mut file, value).map_err(backend)?;
    file.write_all(b"\n").map_err(backend)?;
    file.as_file().sync_all().map_err(backend)?;
    file.persist(dir.join(name)).map_err(backend)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use compplan_model::{participant::Side, test::TestNetwork, LedgerExt, Settlement};
    use rust_decimal_macros::dec;

    use super::*;

    fn team() -> TestNetwork {
        let mut net = TestNetwork::default();
        net.root(1)
            .enroll(2, 1, Side::Left)
            .enroll(3, 1, Side::Right)
            .order(1, dec!(200))
            .order(2, dec!(600))
            .order(3, dec!(400));
        net
    }

    #[test]
    fn lock_prevents_concurrent_runs() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let ledger = FileLedger::new(dir.path());
        let other = FileLedger::new(dir.path());

        ledger.begin("2026-01")?;
        assert!(matches!(
            other.begin("2026-01"),
            Err(compplan_model::Error::SettlementInProgress(_))
        ));
        assert!(matches!(
            ledger.clone().begin("2026-01"),
            Err(compplan_model::Error::SettlementInProgress(_))
        ));
        assert_eq!(other.status("2026-01")?, RunStatus::Running);
        assert!(matches!(
            other.fail("2026-01", "not mine"),
            Err(compplan_model::Error::SettlementNotRunning(_))
        ));

        ledger.fail("2026-01", "snapshot rejected")?;
        assert!(matches!(
            other.status("2026-01")?,
            RunStatus::Failed { reason } if reason == "snapshot rejected"
        ));
        other.begin("2026-01")?;
        Ok(())
    }

    #[test]
    fn interrupted_run_is_retried() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let ledger = FileLedger::new(dir.path());
        ledger.begin("2026-01")?;
        // Neither committed nor failed.
        drop(ledger);

        let reopened = FileLedger::new(dir.path());
        assert_eq!(reopened.status("2026-01")?, RunStatus::Running);

        let net = team();
        let network = net.network()?;
        let settlement = Settlement::try_new(
            &network,
            net.orders(),
            compplan_model::test::january(),
            Arc::new(compplan_model::test::default_plan()),
        )?;
        reopened.settle(settlement)?;
        assert!(matches!(
            reopened.status("2026-01")?,
            RunStatus::Completed { total, .. } if total == dec!(440)
        ));
        Ok(())
    }

    #[test]
    fn settle_and_reload() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let ledger = FileLedger::new(dir.path());
        let net = team();
        let network = net.network()?;
        let plan = Arc::new(compplan_model::test::default_plan());

        let settlement = Settlement::try_new(
            &network,
            net.orders(),
            compplan_model::test::january(),
            plan.clone(),
        )?;
        let report = ledger.settle(settlement)?;

        let reopened = FileLedger::new(dir.path());
        assert!(matches!(
            reopened.status("2026-01")?,
            RunStatus::Completed { total, .. } if total == dec!(440)
        ));
        let stored = reopened.report("2026-01")?.expect("stored report");
        assert_eq!(stored.records(), report.records());
        assert_eq!(stored.payouts(), report.payouts());

        for ledger in [&ledger, &reopened] {
            let settlement = Settlement::try_new(
                &network,
                net.orders(),
                compplan_model::test::january(),
                plan.clone(),
            )?;
            assert!(matches!(
                ledger.settle(settlement),
                Err(compplan_model::Error::AlreadySettled(_))
            ));
        }
        let files: Vec<_> = fs::read_dir(dir.path().join("2026-01"))?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<Result<_, _>>()?;
        assert_eq!(files.len(), 3);
        Ok(())
    }

    #[test]
    fn rejects_path_like_periods() {
        let ledger = FileLedger::new("ledger");
        for period in ["", "../2026-01", "2026/01", ".hidden"] {
            assert!(matches!(
                ledger.status(period),
                Err(compplan_model::Error::InvalidPeriod(_))
            ));
        }
    }
}
