//! Atom catalog error types

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No definition carries the requested name
    #[error("atom '{0}' not found in catalog")]
    AtomNotFound(String),

    /// The name matched but the arguments do not fit any of its definitions
    #[error("invalid arguments for atom '{atom}': {reason}")]
    InvalidArguments { atom: String, reason: String },

    /// A definition was rejected while building the catalog
    #[error("invalid atom registration: {0}")]
    Registration(String),
}

impl CatalogError {
    pub(crate) fn invalid(atom: &str, reason: impl Into<String>) -> Self {
        CatalogError::InvalidArguments {
            atom: atom.to_string(),
            reason: reason.into(),
        }
    }
}
