use anyhow::Result;

use super::catalog::{cmd_atoms, cmd_interactions};
use super::run::cmd_run;
use super::validate::cmd_validate;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use crate::cli::env::CliArgs;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Validate(args) => cmd_validate(args, ctx).await,
        Commands::Atoms => cmd_atoms(ctx),
        Commands::Interactions => cmd_interactions(ctx),
    }
}
