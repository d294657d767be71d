//! Interaction dispatch table
//!
//! Maps interaction names from the wire onto typed handlers. The table is built
//! once and closed afterwards; unknown names are rejected instead of being
//! looked up reflectively.

use atom_catalog::{AtomKind, ResolvedAtom};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use webatoms_core_types::AutomationFailure;

use crate::errors::InteractionError;

/// Result of one interaction call.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<H> {
    /// The chain continues on this handle
    Handle(H),
    /// Terminal value; only legal from the last step of a chain
    Value(Value),
}

impl<H> StepOutcome<H> {
    pub fn is_handle(&self) -> bool {
        matches!(self, StepOutcome::Handle(_))
    }
}

/// Which atoms a unary interaction takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepts {
    Any,
    Kind(AtomKind),
}

impl Accepts {
    pub fn admits(&self, kind: AtomKind) -> bool {
        match self {
            Accepts::Any => true,
            Accepts::Kind(expected) => *expected == kind,
        }
    }

    fn overlaps(&self, other: &Accepts) -> bool {
        match (self, other) {
            (Accepts::Kind(a), Accepts::Kind(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for Accepts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accepts::Any => f.write_str("atom"),
            Accepts::Kind(kind) => write!(f, "{} atom", kind),
        }
    }
}

type NullaryFn<H> = Box<dyn Fn(H) -> Result<StepOutcome<H>, AutomationFailure> + Send + Sync>;
type UnaryFn<H> =
    Box<dyn Fn(H, ResolvedAtom) -> Result<StepOutcome<H>, AutomationFailure> + Send + Sync>;

enum Handler<H> {
    Nullary(NullaryFn<H>),
    Unary(Accepts, UnaryFn<H>),
}

impl<H> Handler<H> {
    fn signature(&self, name: &str) -> String {
        match self {
            Handler::Nullary(_) => format!("{}()", name),
            Handler::Unary(accepts, _) => format!("{}({})", name, accepts),
        }
    }

    fn conflicts(&self, other: &Handler<H>) -> bool {
        match (self, other) {
            (Handler::Nullary(_), Handler::Nullary(_)) => true,
            (Handler::Unary(a, _), Handler::Unary(b, _)) => a.overlaps(b),
            _ => false,
        }
    }
}

/// Collects handlers and validates them into an [`InteractionTable`].
pub struct InteractionTableBuilder<H> {
    pending: Vec<(String, Handler<H>)>,
}

impl<H> Default for InteractionTableBuilder<H> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<H> InteractionTableBuilder<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interaction that takes no atom
    pub fn nullary<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(H) -> Result<StepOutcome<H>, AutomationFailure> + Send + Sync + 'static,
    {
        self.pending
            .push((name.to_string(), Handler::Nullary(Box::new(handler))));
        self
    }

    /// Register an interaction that takes exactly one atom
    pub fn unary<F>(mut self, name: &str, accepts: Accepts, handler: F) -> Self
    where
        F: Fn(H, ResolvedAtom) -> Result<StepOutcome<H>, AutomationFailure> + Send + Sync + 'static,
    {
        self.pending
            .push((name.to_string(), Handler::Unary(accepts, Box::new(handler))));
        self
    }

    pub fn build(self) -> Result<InteractionTable<H>, InteractionError> {
        let mut entries: BTreeMap<String, Vec<Handler<H>>> = BTreeMap::new();

        for (name, handler) in self.pending {
            if name.trim().is_empty() {
                return Err(InteractionError::Registration(
                    "interaction name cannot be empty".to_string(),
                ));
            }
            let overloads = entries.entry(name.clone()).or_default();
            if let Some(existing) = overloads.iter().find(|h| h.conflicts(&handler)) {
                return Err(InteractionError::Registration(format!(
                    "'{}' is ambiguous with '{}'",
                    handler.signature(&name),
                    existing.signature(&name)
                )));
            }
            overloads.push(handler);
        }

        Ok(InteractionTable { entries })
    }
}

/// Closed vocabulary of interactions supported by handle type `H`.
pub struct InteractionTable<H> {
    entries: BTreeMap<String, Vec<Handler<H>>>,
}

impl<H> InteractionTable<H> {
    pub fn builder() -> InteractionTableBuilder<H> {
        InteractionTableBuilder::new()
    }

    /// Invoke `name` on `handle`, feeding it `atom` when present.
    pub fn invoke(
        &self,
        handle: H,
        name: &str,
        atom: Option<ResolvedAtom>,
    ) -> Result<StepOutcome<H>, InteractionError> {
        let overloads = self
            .entries
            .get(name)
            .ok_or_else(|| InteractionError::UnknownInteraction(name.to_string()))?;

        let outcome = match atom {
            Some(atom) => {
                let handler = overloads
                    .iter()
                    .find_map(|handler| match handler {
                        Handler::Unary(accepts, f) if accepts.admits(atom.kind) => Some(f),
                        _ => None,
                    })
                    .ok_or_else(|| InteractionError::InvalidArguments {
                        interaction: name.to_string(),
                        reason: format!(
                            "no overload takes '{}' ({}); expected {}",
                            atom.name,
                            atom.kind,
                            self.describe(name)
                        ),
                    })?;
                debug!(interaction = name, atom = %atom, "Dispatching unary interaction");
                handler(handle, atom)
            }
            None => {
                let handler = overloads
                    .iter()
                    .find_map(|handler| match handler {
                        Handler::Nullary(f) => Some(f),
                        _ => None,
                    })
                    .ok_or_else(|| InteractionError::InvalidArguments {
                        interaction: name.to_string(),
                        reason: format!("an atom is required; expected {}", self.describe(name)),
                    })?;
                debug!(interaction = name, "Dispatching nullary interaction");
                handler(handle)
            }
        };

        outcome.map_err(|source| InteractionError::Automation {
            interaction: name.to_string(),
            source,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Supported interaction names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every registered signature, e.g. `withElement(element atom)`
    pub fn signatures(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(name, overloads)| overloads.iter().map(move |h| h.signature(name)))
            .collect()
    }

    fn describe(&self, name: &str) -> String {
        self.entries
            .get(name)
            .map(|overloads| {
                overloads
                    .iter()
                    .map(|h| h.signature(name))
                    .collect::<Vec<_>>()
                    .join(" or ")
            })
            .unwrap_or_default()
    }
}

impl<H> fmt::Debug for InteractionTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionTable")
            .field("signatures", &self.signatures())
            .finish()
    }
}
