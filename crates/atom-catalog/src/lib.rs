//! Atom catalog
//!
//! Atoms are the primitive actions and queries a web interaction is fed with
//! (find an element, click it, read its text). This crate maps an atom name and
//! a list of wire arguments onto a typed [`AtomOp`]:
//! - definitions are registered once, keyed by name and arity
//! - overlapping registrations are rejected up front
//! - resolution is exact and case-sensitive, never fuzzy

pub mod catalog;
mod driver;
pub mod errors;
pub mod types;

pub use catalog::{AtomArgs, AtomBuilder, AtomCatalog, AtomCatalogBuilder, AtomDefinition};
pub use driver::driver_atoms;
pub use errors::CatalogError;
pub use types::{AtomKind, AtomOp, Locator, ParamType, ResolvedAtom};
