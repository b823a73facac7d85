use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use rust_decimal::Decimal;

use super::{Settlement, SettlementReport};

/// Status of the settlement of a period.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum RunStatus {
    /// No run has been started.
    NotRun,
    /// A run is in progress.
    Running,
    /// The last run failed and committed nothing.
    Failed {
        /// Failure description.
        reason: String,
    },
    /// The period is settled.
    Completed {
        /// Plan version used.
        plan_version: u32,
        /// Number of records committed.
        records: usize,
        /// Total payable.
        total: Decimal,
    },
}

impl RunStatus {
    /// Returns whether a new run may be started.
    pub fn can_begin(&self) -> bool {
        matches!(self, Self::NotRun | Self::Failed { .. })
    }

    pub(crate) fn check_begin(&self, period: &str) -> crate::Result<()> {
        match self {
            Self::Running => Err(crate::Error::SettlementInProgress(period.to_string())),
            Self::Completed { .. } => Err(crate::Error::AlreadySettled(period.to_string())),
            Self::NotRun | Self::Failed { .. } => Ok(()),
        }
    }

    pub(crate) fn completed(report: &SettlementReport) -> crate::Result<Self> {
        Ok(Self::Completed {
            plan_version: report.plan_version(),
            records: report.records().len(),
            total: report.total_payable()?,
        })
    }
}

/// Durable bookkeeping of settlement runs.
///
/// Implementations must make [`Ledger::begin`] atomic so that at most one
/// run per period is in progress, and [`Ledger::commit`] all-or-nothing.
pub trait Ledger {
    /// Get the status of a period.
    fn status(&self, period: &str) -> crate::Result<RunStatus>;

    /// Mark the period as running.
    ///
    /// Fails if a run is in progress or the period is already settled.
    fn begin(&self, period: &str) -> crate::Result<()>;

    /// Commit every record of a report and mark the period completed.
    fn commit(&self, report: &SettlementReport) -> crate::Result<()>;

    /// Mark the running period as failed.
    fn fail(&self, period: &str, reason: &str) -> crate::Result<()>;
}

/// Extension trait for [`Ledger`].
pub trait LedgerExt: Ledger {
    /// Run a settlement inside a begin/commit boundary.
    ///
    /// On error the period is marked failed and nothing is committed. The
    /// settlement error is returned even if marking the period fails.
    fn settle(&self, settlement: Settlement<'_>) -> crate::Result<SettlementReport> {
        let period = settlement.period().key().to_string();
        self.begin(&period)?;
        let result = settlement
            .execute()
            .and_then(|report| self.commit(&report).map(|()| report));
        if let Err(err) = &result {
            tracing::warn!(%period, %err, "settlement failed");
            if let Err(fail_err) = self.fail(&period, &err.to_string()) {
                tracing::error!(%period, %err, %fail_err, "failed to record the failed run");
            }
        }
        result
    }
}

impl<L: Ledger + ?Sized> LedgerExt for L {}

#[derive(Debug)]
struct Entry {
    status: RunStatus,
    report: Option<SettlementReport>,
}

/// In-memory [`Ledger`].
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryLedger {
    fn entries(&self) -> crate::Result<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| crate::Error::Backend("ledger lock poisoned".to_string()))
    }

    /// Get the committed report of a period.
    pub fn report(&self, period: &str) -> crate::Result<Option<SettlementReport>> {
        Ok(self
            .entries()?
            .get(period)
            .and_then(|entry| entry.report.clone()))
    }
}

impl Ledger for MemoryLedger {
    fn status(&self, period: &str) -> crate::Result<RunStatus> {
        Ok(self
            .entries()?
            .get(period)
            .map(|entry| entry.status.clone())
            .unwrap_or(RunStatus::NotRun))
    }

    fn begin(&self, period: &str) -> crate::Result<()> {
        let mut entries = self.entries()?;
        let entry = entries.entry(period.to_string()).or_insert(Entry {
            status: RunStatus::NotRun,
            report: None,
        });
        entry.status.check_begin(period)?;
        entry.status = RunStatus::Running;
        Ok(())
    }

    fn commit(&self, report: &SettlementReport) -> crate::Result<()> {
        let period = report.period().key();
        let status = RunStatus::completed(report)?;
        let mut entries = self.entries()?;
        let entry = entries
            .get_mut(period)
            .filter(|entry| entry.status == RunStatus::Running)
            .ok_or_else(|| crate::Error::SettlementNotRunning(period.to_string()))?;
        entry.status = status;
        entry.report = Some(report.clone());
        Ok(())
    }

    fn fail(&self, period: &str, reason: &str) -> crate::Result<()> {
        let mut entries = self.entries()?;
        let entry = entries
            .get_mut(period)
            .filter(|entry| entry.status == RunStatus::Running)
            .ok_or_else(|| crate::Error::SettlementNotRunning(period.to_string()))?;
        entry.status = RunStatus::Failed {
            reason: reason.to_string(),
        };
        Ok(())
    }
}
