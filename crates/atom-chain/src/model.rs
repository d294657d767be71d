//! Command chain request model
//!
//! Field names follow the mobile-command wire payload (`webviewElement`,
//! `forceJavascriptEnabled`, `methodChain`); the descriptive names are accepted
//! as aliases.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use webatoms_core_types::ElementId;

use crate::errors::{ChainError, ChainErrorKind};

/// One automation command: where to start and which steps to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandChainRequest {
    #[serde(
        default,
        rename = "webviewElement",
        alias = "targetSurfaceRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_surface_ref: Option<ElementId>,
    #[serde(default, flatten)]
    pub capability_flags: CapabilityFlags,
    #[serde(default, rename = "methodChain", alias = "steps")]
    pub steps: Vec<ChainStep>,
}

/// Toggles applied to the handle before the first step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityFlags {
    #[serde(
        default,
        rename = "forceJavascriptEnabled",
        alias = "forceScriptingEnabled"
    )]
    pub force_scripting_enabled: bool,
}

/// One interaction call in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    #[serde(rename = "name", alias = "interactionName")]
    pub interaction_name: String,
    #[serde(
        default,
        deserialize_with = "named_atom",
        skip_serializing_if = "Option::is_none"
    )]
    pub atom: Option<AtomSpec>,
}

/// Atom to instantiate and feed to the interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomSpec {
    #[serde(alias = "atomName")]
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Deserialize)]
struct WireAtom {
    #[serde(default, alias = "atomName")]
    name: Option<String>,
    #[serde(default)]
    args: Vec<Value>,
}

// A nameless atom with no arguments is the same as no atom at all. A nameless
// atom with arguments keeps an empty name so `validate` rejects the step.
fn named_atom<'de, D>(deserializer: D) -> Result<Option<AtomSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = Option::<WireAtom>::deserialize(deserializer)?;
    Ok(wire.and_then(|atom| match atom.name {
        Some(name) => Some(AtomSpec {
            name,
            args: atom.args,
        }),
        None if atom.args.is_empty() => None,
        None => Some(AtomSpec {
            name: String::new(),
            args: atom.args,
        }),
    }))
}

impl CommandChainRequest {
    pub fn new(steps: Vec<ChainStep>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }

    pub fn targeting(mut self, element: ElementId) -> Self {
        self.target_surface_ref = Some(element);
        self
    }

    pub fn force_scripting(mut self, enabled: bool) -> Self {
        self.capability_flags.force_scripting_enabled = enabled;
        self
    }

    /// Reject steps with empty interaction or atom names.
    pub fn validate(&self) -> Result<(), ChainError> {
        for (index, step) in self.steps.iter().enumerate() {
            if step.interaction_name.trim().is_empty() {
                return Err(ChainError::at_step(
                    ChainErrorKind::InvalidArguments,
                    index,
                    format!("step {}: interaction name cannot be empty", index),
                ));
            }
            if let Some(atom) = &step.atom {
                if atom.name.trim().is_empty() {
                    return Err(ChainError::at_step(
                        ChainErrorKind::InvalidArguments,
                        index,
                        format!(
                            "step {} ('{}'): atom name cannot be empty",
                            index, step.interaction_name
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl ChainStep {
    pub fn new(interaction: impl Into<String>) -> Self {
        Self {
            interaction_name: interaction.into(),
            atom: None,
        }
    }

    pub fn with_atom(mut self, atom: AtomSpec) -> Self {
        self.atom = Some(atom);
        self
    }
}

impl AtomSpec {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}
