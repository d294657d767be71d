use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Opaque failure reported by the automation layer.
///
/// The chain engine never inspects it beyond its message; it is wrapped with
/// the interaction name and passed through to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomationFailure {
    #[error("{message}")]
    Message { message: String },
}

impl AutomationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Message { message } => message,
        }
    }
}

/// Identifier of a native element held by the element registry.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation id of one chain execution.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Matcher selecting one concrete web view on screen.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ViewMatcher {
    pub view: String,
}

impl ViewMatcher {
    pub fn with_view(view: impl Into<String>) -> Self {
        Self { view: view.into() }
    }
}

impl fmt::Display for ViewMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "withView({})", self.view)
    }
}

/// Which web surface an interaction is bound to.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SurfaceScope {
    /// Whatever web view is currently displayed.
    #[default]
    Default,
    View(ViewMatcher),
}

impl fmt::Display for SurfaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceScope::Default => f.write_str("default"),
            SurfaceScope::View(matcher) => matcher.fmt(f),
        }
    }
}

/// Reference to a DOM element inside a web surface, as returned by element atoms.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementRef(pub String);

/// Reference to a window or frame inside a web surface.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct WindowRef(pub String);
