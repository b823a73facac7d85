mod output;

use std::path::{Path, PathBuf};

pub use output::{DisplayOptions, OutputFormat};

const DEFAULT_PLAN: &str = "plan.toml";
const DEFAULT_LEDGER_DIR: &str = "ledger";

/// Configuration.
///
/// Unset fields are not serialized, so they never override values from
/// the config file or the environment.
#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct Config {
    /// Path to the plan file.
    #[arg(long, env = "COMPPLAN_PLAN")]
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<PathBuf>,
    /// Directory holding the settlement ledger.
    #[arg(long, env = "COMPPLAN_LEDGER_DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    ledger_dir: Option<PathBuf>,
    /// Output format.
    #[arg(long, short, env = "COMPPLAN_OUTPUT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<OutputFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plan: Some(DEFAULT_PLAN.into()),
            ledger_dir: Some(DEFAULT_LEDGER_DIR.into()),
            output: Some(OutputFormat::Table),
        }
    }
}

impl Config {
    /// Path to the plan file.
    pub fn plan(&self) -> &Path {
        self.plan
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_PLAN))
    }

    /// Ledger directory.
    pub fn ledger_dir(&self) -> &Path {
        self.ledger_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_LEDGER_DIR))
    }

    /// Output format.
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    use super::*;

    #[test]
    fn file_values_survive_unset_arguments() -> eyre::Result<()> {
        let args = Config {
            plan: None,
            ledger_dir: Some("/var/lib/compplan".into()),
            output: None,
        };
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                plan = "/etc/compplan/plan.toml"
                output = "json"
                ledger_dir = "/tmp/ledger"
                "#,
            ))
            .merge(Serialized::defaults(args))
            .extract()?;
        assert_eq!(config.plan(), Path::new("/etc/compplan/plan.toml"));
        assert_eq!(config.ledger_dir(), Path::new("/var/lib/compplan"));
        assert!(matches!(config.output(), OutputFormat::Json));
        Ok(())
    }

    #[test]
    fn default_config_is_valid_toml() -> eyre::Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        let config: Config = toml::from_str(&content)?;
        assert_eq!(config.plan(), Path::new(DEFAULT_PLAN));
        assert!(matches!(config.output(), OutputFormat::Table));
        Ok(())
    }
}
