//! Web interactions
//!
//! An interaction handle is the current point of contact with a web surface.
//! Every call on it yields either a new handle or a terminal value; handles are
//! replaced, never mutated in place.
//!
//! This crate provides:
//! - [`InteractionTable`], the closed name-to-handler dispatch table
//! - the collaborator ports a handle relies on ([`WebViewPort`],
//!   [`ElementRegistry`], [`SurfaceLauncher`])
//! - [`WebInteraction`], the concrete handle over a [`WebViewPort`]
//! - an in-memory web surface for local runs and tests

pub mod errors;
pub mod handle;
pub mod memory;
pub mod ports;
pub mod vocabulary;

pub use errors::InteractionError;
pub use handle::{WebInteraction, WebViewLauncher, DEFAULT_TIMEOUT};
pub use memory::{
    DomNode, FrameFixture, MemoryElementRegistry, MemoryWebView, PageFixture, SurfaceEvent,
};
pub use ports::{ElementRegistry, EvalContext, SurfaceLauncher, WebViewPort};
pub use vocabulary::{Accepts, InteractionTable, InteractionTableBuilder, StepOutcome};
