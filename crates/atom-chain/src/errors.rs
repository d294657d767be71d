//! Chain execution error types

use atom_catalog::CatalogError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use web_interaction::InteractionError;

/// Why a chain failed. Every kind is terminal for the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChainErrorKind {
    /// The target surface reference is not a live view
    ElementNotFound,
    /// No atom carries the requested name
    AtomNotFound,
    /// Malformed step, or an atom/interaction called with the wrong operands
    InvalidArguments,
    /// The interaction name is not in the handle's vocabulary
    UnknownInteraction,
    /// A step returned a value where the chain needed a handle
    UnexpectedReturnType,
    /// The automation layer itself failed
    UnderlyingAutomationFailure,
}

impl ChainErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ChainErrorKind::ElementNotFound => "element_not_found",
            ChainErrorKind::AtomNotFound => "atom_not_found",
            ChainErrorKind::InvalidArguments => "invalid_arguments",
            ChainErrorKind::UnknownInteraction => "unknown_interaction",
            ChainErrorKind::UnexpectedReturnType => "unexpected_return_type",
            ChainErrorKind::UnderlyingAutomationFailure => "underlying_automation_failure",
        }
    }
}

impl fmt::Display for ChainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure reported to the caller of a chain.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}: {message}")]
pub struct ChainError {
    pub kind: ChainErrorKind,
    pub message: String,
    /// Index of the failing step, if the chain got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

impl ChainError {
    pub fn new(kind: ChainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            step: None,
        }
    }

    pub fn at_step(kind: ChainErrorKind, step: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            step: Some(step),
        }
    }

    pub(crate) fn from_catalog(err: CatalogError, step: usize, interaction: &str) -> Self {
        let kind = match &err {
            CatalogError::AtomNotFound(_) => ChainErrorKind::AtomNotFound,
            CatalogError::InvalidArguments { .. } | CatalogError::Registration(_) => {
                ChainErrorKind::InvalidArguments
            }
        };
        Self::at_step(
            kind,
            step,
            format!("step {} ('{}'): {}", step, interaction, err),
        )
    }

    pub(crate) fn from_interaction(err: InteractionError, step: usize) -> Self {
        let kind = match &err {
            InteractionError::UnknownInteraction(_) => ChainErrorKind::UnknownInteraction,
            InteractionError::InvalidArguments { .. } | InteractionError::Registration(_) => {
                ChainErrorKind::InvalidArguments
            }
            InteractionError::Automation { .. } => ChainErrorKind::UnderlyingAutomationFailure,
        };
        Self::at_step(kind, step, format!("step {}: {}", step, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webatoms_core_types::AutomationFailure;

    #[test]
    fn catalog_errors_map_to_kinds() {
        let err = ChainError::from_catalog(
            CatalogError::AtomNotFound("webClik".to_string()),
            2,
            "perform",
        );
        assert_eq!(err.kind, ChainErrorKind::AtomNotFound);
        assert_eq!(err.step, Some(2));
        assert!(err.message.contains("perform"));
        assert!(err.message.contains("webClik"));
    }

    #[test]
    fn automation_failures_keep_interaction_name() {
        let err = ChainError::from_interaction(
            InteractionError::Automation {
                interaction: "perform".to_string(),
                source: AutomationFailure::new("element 'node-2' is not interactable"),
            },
            1,
        );
        assert_eq!(err.kind, ChainErrorKind::UnderlyingAutomationFailure);
        assert_eq!(
            err.to_string(),
            "underlying_automation_failure: step 1: interaction 'perform' failed: element 'node-2' is not interactable"
        );
    }

    #[test]
    fn serializes_kind_and_message() {
        let err = ChainError::new(ChainErrorKind::ElementNotFound, "no element 'el-1'");
        let encoded = serde_json::to_value(&err).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({ "kind": "ElementNotFound", "message": "no element 'el-1'" })
        );
    }
}
