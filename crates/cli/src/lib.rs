#![deny(missing_docs)]

//! Batch runner for compensation plan settlements.

/// Configuration.
pub mod config;

/// Plan file.
pub mod plan;

/// File-backed settlement ledger.
pub mod ledger;

/// Commands.
pub mod commands;

use std::{ops::Deref, path::PathBuf};

use clap::Parser;
use commands::{Command, Commands, Context};
use config::Config;
use eyre::OptionExt;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

const ENV_PREFIX: &str = "COMPPLAN_";
const CONFIG_DIR: &str = "compplan";

/// `__` in environment variable names stands for `.`.
///
/// See [`Env`] for more information.
const DOT_ALIAS: &str = "__";

/// Command-line interface of the compensation plan engine.
#[derive(Debug)]
pub struct Cli(Inner);

impl Cli {
    /// Creates from the command line arguments.
    ///
    /// Values from the command line override environment variables, which
    /// override the config file.
    pub fn init() -> eyre::Result<Self> {
        let cli = Inner::parse();

        let config_path = cli.find_config()?;
        let Inner {
            config, command, ..
        } = cli;

        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed(ENV_PREFIX).split(DOT_ALIAS))
            .merge(Serialized::defaults(config))
            .extract()?;

        Ok(Self(Inner {
            config_path: Some(config_path),
            config,
            command,
        }))
    }
}

impl Deref for Cli {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Command-line interface of the compensation plan engine.
#[derive(Debug, Parser)]
#[command(name = "compplan", version)]
pub struct Inner {
    /// Path to the config file.
    #[clap(long = "config", short)]
    config_path: Option<PathBuf>,
    /// Config.
    #[command(flatten)]
    config: Config,
    /// Commands.
    #[command(subcommand)]
    command: Commands,
}

impl Inner {
    fn find_config(&self) -> eyre::Result<PathBuf> {
        use etcetera::{choose_base_strategy, BaseStrategy};

        match self.config_path.as_ref() {
            Some(path) => Ok(path.clone()),
            None => {
                let strategy = choose_base_strategy()?;
                Ok(strategy.config_dir().join(CONFIG_DIR).join("config.toml"))
            }
        }
    }

    /// Execute command.
    pub async fn execute(&self) -> eyre::Result<()> {
        let config_path = self
            .config_path
            .as_ref()
            .ok_or_eyre("config path is not set")?;
        self.command
            .execute(Context::new(config_path, &self.config))
            .await
    }
}
