//! Atom registry and resolution

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::errors::CatalogError;
use crate::types::{AtomKind, AtomOp, Locator, ParamType, ResolvedAtom};

/// Typed constructor turning validated wire arguments into an [`AtomOp`].
pub type AtomBuilder = fn(&AtomArgs<'_>) -> Result<AtomOp, CatalogError>;

/// One registered atom signature.
#[derive(Clone)]
pub struct AtomDefinition {
    name: String,
    params: Vec<ParamType>,
    variadic: Option<ParamType>,
    kind: AtomKind,
    build: AtomBuilder,
}

impl AtomDefinition {
    pub fn new(name: impl Into<String>, kind: AtomKind, build: AtomBuilder) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            variadic: None,
            kind,
            build,
        }
    }

    /// Append a fixed parameter
    pub fn param(mut self, param: ParamType) -> Self {
        self.params.push(param);
        self
    }

    /// Accept any number of trailing arguments of the given type
    pub fn variadic(mut self, param: ParamType) -> Self {
        self.variadic = Some(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    pub fn trailing(&self) -> Option<ParamType> {
        self.variadic
    }

    pub fn kind(&self) -> AtomKind {
        self.kind
    }

    /// Number of fixed parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    fn accepts_arity(&self, count: usize) -> bool {
        match self.variadic {
            Some(_) => count >= self.arity(),
            None => count == self.arity(),
        }
    }

    fn overlaps(&self, other: &AtomDefinition) -> bool {
        match (self.variadic, other.variadic) {
            (None, None) => self.arity() == other.arity(),
            (Some(_), None) => other.arity() >= self.arity(),
            (None, Some(_)) => self.arity() >= other.arity(),
            (Some(_), Some(_)) => true,
        }
    }

    fn param_at(&self, index: usize) -> Option<ParamType> {
        self.params.get(index).copied().or(self.variadic)
    }

    /// Human-readable signature, e.g. `findElement(Locator, String) -> element`
    pub fn signature(&self) -> String {
        let mut params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        if let Some(rest) = self.variadic {
            params.push(format!("{}...", rest));
        }
        format!("{}({}) -> {}", self.name, params.join(", "), self.kind)
    }
}

impl fmt::Debug for AtomDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomDefinition")
            .field("signature", &self.signature())
            .finish()
    }
}

/// Positional view over the wire arguments of one atom call.
///
/// Arguments have already been type-checked against the definition when a
/// builder sees them; accessors still report mismatches instead of panicking.
pub struct AtomArgs<'a> {
    atom: &'a str,
    values: &'a [Value],
}

impl<'a> AtomArgs<'a> {
    pub fn new(atom: &'a str, values: &'a [Value]) -> Self {
        Self { atom, values }
    }

    fn get(&self, index: usize) -> Result<&'a Value, CatalogError> {
        self.values
            .get(index)
            .ok_or_else(|| CatalogError::invalid(self.atom, format!("missing argument {}", index)))
    }

    pub fn string(&self, index: usize) -> Result<String, CatalogError> {
        self.get(index)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(index, ParamType::String))
    }

    pub fn integer(&self, index: usize) -> Result<i64, CatalogError> {
        self.get(index)?
            .as_i64()
            .ok_or_else(|| self.mismatch(index, ParamType::Integer))
    }

    pub fn locator(&self, index: usize) -> Result<Locator, CatalogError> {
        self.get(index)?
            .as_str()
            .and_then(Locator::from_wire)
            .ok_or_else(|| self.mismatch(index, ParamType::Locator))
    }

    /// Arguments from `index` onwards (empty when out of range)
    pub fn rest(&self, index: usize) -> Vec<Value> {
        self.values.get(index..).map(<[Value]>::to_vec).unwrap_or_default()
    }

    fn mismatch(&self, index: usize, expected: ParamType) -> CatalogError {
        CatalogError::invalid(
            self.atom,
            format!("argument {} must be {}", index, expected),
        )
    }
}

/// Builds an [`AtomCatalog`], rejecting ambiguous registrations.
#[derive(Debug, Default)]
pub struct AtomCatalogBuilder {
    definitions: BTreeMap<String, Vec<AtomDefinition>>,
}

impl AtomCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, definition: AtomDefinition) -> Result<Self, CatalogError> {
        if definition.name.trim().is_empty() {
            return Err(CatalogError::Registration(
                "atom name cannot be empty".to_string(),
            ));
        }

        let overloads = self
            .definitions
            .entry(definition.name.clone())
            .or_default();
        if let Some(existing) = overloads.iter().find(|d| d.overlaps(&definition)) {
            return Err(CatalogError::Registration(format!(
                "'{}' is ambiguous with '{}'",
                definition.signature(),
                existing.signature()
            )));
        }
        overloads.push(definition);
        Ok(self)
    }

    pub fn build(self) -> AtomCatalog {
        AtomCatalog {
            definitions: self.definitions,
        }
    }
}

/// Immutable atom registry keyed by `(name, arity)`.
#[derive(Debug, Clone)]
pub struct AtomCatalog {
    definitions: BTreeMap<String, Vec<AtomDefinition>>,
}

impl AtomCatalog {
    pub fn builder() -> AtomCatalogBuilder {
        AtomCatalogBuilder::new()
    }

    /// Resolve `name(args...)` into a ready-to-use atom.
    pub fn resolve(&self, name: &str, args: &[Value]) -> Result<ResolvedAtom, CatalogError> {
        let overloads = self
            .definitions
            .get(name)
            .ok_or_else(|| CatalogError::AtomNotFound(name.to_string()))?;

        let definition = overloads
            .iter()
            .find(|d| d.accepts_arity(args.len()))
            .ok_or_else(|| {
                let expected: Vec<String> = overloads.iter().map(|d| d.signature()).collect();
                CatalogError::invalid(
                    name,
                    format!(
                        "got {} argument(s), expected {}",
                        args.len(),
                        expected.join(" or ")
                    ),
                )
            })?;

        for (index, value) in args.iter().enumerate() {
            let expected = definition.param_at(index).unwrap_or(ParamType::Any);
            if !expected.accepts(value) {
                return Err(CatalogError::invalid(
                    name,
                    format!("argument {} must be {}, got {}", index, expected, value),
                ));
            }
        }

        let op = (definition.build)(&AtomArgs::new(name, args))?;
        debug!(atom = name, kind = %definition.kind, args = args.len(), "Resolved atom");

        Ok(ResolvedAtom {
            name: name.to_string(),
            kind: definition.kind,
            op,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All definitions ordered by name
    pub fn definitions(&self) -> impl Iterator<Item = &AtomDefinition> {
        self.definitions.values().flatten()
    }
}
