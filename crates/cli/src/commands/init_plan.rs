use std::path::PathBuf;

use crate::plan::PlanFile;

use super::{utils::write_new_file, Command, Context};

/// Write the default plan.
#[derive(Debug, clap::Args)]
pub struct InitPlan {
    /// Replace if the plan file already exists.
    #[arg(long, short)]
    force: bool,
    /// Where to write the plan. Defaults to the configured plan path.
    path: Option<PathBuf>,
}

impl Command for InitPlan {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let path = self
            .path
            .as_deref()
            .unwrap_or_else(|| ctx.config().plan());
        let content = toml::to_string_pretty(&PlanFile::default())?;
        write_new_file(path, &content, self.force).await?;
        println!("{}", path.display());
        Ok(())
    }
}
