//! CLI error types

use atom_chain::ChainError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The chain ran and stopped at a failure
    #[error("command chain failed: {0}")]
    ChainFailed(ChainError),

    /// The request was rejected before anything ran
    #[error("request is invalid: {0}")]
    InvalidRequest(ChainError),

    #[error("unsupported document format for {}; expected .json, .yaml or .yml", path.display())]
    UnsupportedFormat { path: PathBuf },
}
