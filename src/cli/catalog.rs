use anyhow::{Context, Result};
use atom_catalog::driver_atoms;
use serde::Serialize;
use web_interaction::WebInteraction;

use super::context::CliContext;
use super::output::print_list;

#[derive(Debug, Serialize)]
struct AtomEntry {
    name: String,
    kind: String,
    params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variadic: Option<String>,
    signature: String,
}

pub fn cmd_atoms(ctx: &CliContext) -> Result<()> {
    let catalog = driver_atoms().context("Failed to build atom catalog")?;
    let entries: Vec<AtomEntry> = catalog
        .definitions()
        .map(|def| AtomEntry {
            name: def.name().to_string(),
            kind: def.kind().to_string(),
            params: def.params().iter().map(ToString::to_string).collect(),
            variadic: def.trailing().map(|param| param.to_string()),
            signature: def.signature(),
        })
        .collect();
    print_list(ctx.output(), &entries, |entry| entry.signature.clone())
}

pub fn cmd_interactions(ctx: &CliContext) -> Result<()> {
    let table = WebInteraction::vocabulary().context("Failed to build interaction table")?;
    print_list(ctx.output(), &table.signatures(), Clone::clone)
}
