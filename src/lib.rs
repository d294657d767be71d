//! WebAtoms command-line library
//!
//! Exposes configuration and CLI modules for integration testing

pub mod cli;
pub mod config;
pub mod errors;

pub use config::Config;
pub use errors::CliError;
