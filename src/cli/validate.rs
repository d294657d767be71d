use std::path::PathBuf;

use anyhow::{Context, Result};
use atom_catalog::driver_atoms;
use atom_chain::{preflight, CommandChainRequest};
use clap::Args;
use serde_json::json;
use web_interaction::WebInteraction;

use super::context::CliContext;
use super::documents::read_document;
use super::output::{print_failure, OutputFormat};
use crate::errors::CliError;

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Command chain request (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub request: PathBuf,
}

pub async fn cmd_validate(args: ValidateArgs, ctx: &CliContext) -> Result<()> {
    let request: CommandChainRequest = read_document(&args.request).await?;
    let catalog = driver_atoms().context("Failed to build atom catalog")?;
    let interactions =
        WebInteraction::vocabulary().context("Failed to build interaction table")?;

    if let Err(err) = preflight(&request, &catalog, &interactions) {
        print_failure(ctx.output(), &err)?;
        return Err(CliError::InvalidRequest(err).into());
    }

    let steps = request.steps.len();
    match ctx.output() {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "valid": true, "steps": steps }))?
        ),
        OutputFormat::Human => println!("Request is valid ({} steps)", steps),
    }
    Ok(())
}
