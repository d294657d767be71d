//! Command chain execution
//!
//! A command chain names a web surface and an ordered list of interaction
//! steps, each optionally fed with an atom. The executor resolves every atom
//! through the catalog, dispatches the interaction on the current handle and
//! threads the resulting handle into the next step. The first failure aborts
//! the chain; effects already applied to the surface are not rolled back.

pub mod diagnostics;
pub mod errors;
pub mod executor;
pub mod model;
pub mod preflight;

pub use diagnostics::{ChainDiagnostics, NoopDiagnostics, TracingDiagnostics};
pub use errors::{ChainError, ChainErrorKind};
pub use executor::{ChainExecutor, ChainReport, ChainState};
pub use model::{AtomSpec, CapabilityFlags, ChainStep, CommandChainRequest};
pub use preflight::preflight;
