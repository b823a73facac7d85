use crate::config::Config;

use super::{utils::write_new_file, Command, Context};

/// Initialize config.
#[derive(Debug, clap::Args)]
pub struct InitConfig {
    /// Replace if the config file already exists.
    #[arg(long, short)]
    force: bool,
}

impl Command for InitConfig {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        write_new_file(ctx.config_path(), &content, self.force).await?;
        println!("{}", ctx.config_path().display());
        Ok(())
    }
}
