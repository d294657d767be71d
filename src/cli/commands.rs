use clap::Subcommand;

use super::run::RunArgs;
use super::validate::ValidateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Execute a command chain against an in-memory page
    Run(RunArgs),

    /// Check a command chain without executing it
    Validate(ValidateArgs),

    /// List the atom catalog
    Atoms,

    /// List the interactions a chain step may name
    Interactions,
}
