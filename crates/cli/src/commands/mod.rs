use std::path::Path;

use enum_dispatch::enum_dispatch;
use init_config::InitConfig;
use init_plan::InitPlan;
use progress::Progress;
use settle::Settle;
use status::{Payouts, Status};

use crate::config::Config;

mod init_config;
mod init_plan;
mod progress;
mod settle;
mod status;
mod utils;

/// Commands.
#[enum_dispatch]
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Initialize config file.
    InitConfig(InitConfig),
    /// Write the default plan file.
    InitPlan(InitPlan),
    /// Settle a period and commit it to the ledger.
    Settle(Settle),
    /// Show the run status of a period.
    Status(Status),
    /// Show the payouts of a settled period.
    Payouts(Payouts),
    /// Preview ranks and rank progress without committing anything.
    Progress(Progress),
}

#[enum_dispatch(Commands)]
pub(crate) trait Command {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()>;
}

/// Execution context.
pub struct Context<'a> {
    config_path: &'a Path,
    config: &'a Config,
}

impl<'a> Context<'a> {
    pub(crate) fn new(config_path: &'a Path, config: &'a Config) -> Self {
        Self {
            config_path,
            config,
        }
    }

    /// Path of the config file.
    pub fn config_path(&self) -> &Path {
        self.config_path
    }

    /// Config.
    pub fn config(&self) -> &Config {
        self.config
    }
}
