pub mod app;
pub mod catalog;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod documents;
pub mod env;
pub mod output;
pub mod run;
pub mod runtime;
pub mod validate;

pub use catalog::{cmd_atoms, cmd_interactions};
pub use run::{cmd_run, RunArgs};
pub use validate::{cmd_validate, ValidateArgs};
